pub mod climate_service;

pub use climate_service::{ClimateService, TrailingYear};
