use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use tracing::{debug, error, info, instrument, warn};
use utoipa::OpenApi;

use crate::db::{DailyTemperatureStats, DbError};
use crate::services::ClimateService;

#[derive(Clone)]
pub struct AppState {
    pub climate_service: ClimateService,
}

const HOME_PAGE: &str = "Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/2016-07-30<br/>\
/api/v1.0/2017-07-29/2017-08-06";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Climate Query Service",
        description = "Read-only queries over daily station precipitation and temperature observations"
    ),
    paths(
        home,
        precipitation,
        stations,
        tobs,
        temperature_stats_from,
        temperature_stats_between
    ),
    tags((name = "climate", description = "Climate observation queries"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    // Static segments win over the `{start}` capture
    let api_routes = Router::new()
        .route("/precipitation", get(precipitation))
        .route("/stations", get(stations))
        .route("/tobs", get(tobs))
        .route("/{start}", get(temperature_stats_from))
        .route("/{start}/{end}", get(temperature_stats_between))
        .with_state(state);

    Router::new()
        .route("/", get(home))
        .route("/openapi.json", get(openapi))
        .nest("/api/v1.0", api_routes)
}

/// List all routes that are available
#[utoipa::path(
    get,
    path = "/",
    tag = "climate",
    responses((status = 200, description = "HTML list of the API routes", body = String, content_type = "text/html"))
)]
async fn home() -> Html<&'static str> {
    debug!("Route listing requested");
    Html(HOME_PAGE)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(generate_openapi_spec())
}

/// Precipitation by date for the trailing year of data
#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    tag = "climate",
    responses(
        (status = 200, description = "JSON object mapping YYYY-MM-DD to precipitation, null where unrecorded"),
        (status = 404, description = "No measurements in the store"),
        (status = 503, description = "Observation store unavailable")
    )
)]
#[instrument(skip(state))]
async fn precipitation(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, StatusCode> {
    debug!("Fetching trailing-year precipitation");
    let by_date = state
        .climate_service
        .precipitation_last_year()
        .await
        .map_err(|e| {
            match e {
                DbError::EmptyDataset => warn!("No measurements available for precipitation"),
                _ => error!("Failed to fetch precipitation: {}", e),
            }
            e.status_code()
        })?;

    info!("Retrieved precipitation for {} dates", by_date.len());
    Ok(Json(by_date))
}

/// Every station id in the dataset
#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    tag = "climate",
    responses(
        (status = 200, description = "Station ids, ascending", body = [String]),
        (status = 503, description = "Observation store unavailable")
    )
)]
#[instrument(skip(state))]
async fn stations(State(state): State<AppState>) -> Result<Json<Vec<String>>, StatusCode> {
    debug!("Fetching station list");
    let stations = state.climate_service.all_stations().await.map_err(|e| {
        error!("Failed to fetch stations: {}", e);
        e.status_code()
    })?;

    info!("Retrieved {} stations", stations.len());
    Ok(Json(stations))
}

/// Temperature observations of the most active station for the trailing year
#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    tag = "climate",
    responses(
        (status = 200, description = "Temperature observations", body = [f64]),
        (status = 404, description = "No measurements in the store"),
        (status = 503, description = "Observation store unavailable")
    )
)]
#[instrument(skip(state))]
async fn tobs(State(state): State<AppState>) -> Result<Json<Vec<f64>>, StatusCode> {
    debug!("Fetching most active station temperatures");
    let temperatures = state
        .climate_service
        .most_active_station_temperatures()
        .await
        .map_err(|e| {
            match e {
                DbError::EmptyDataset => warn!("No measurements available for tobs"),
                _ => error!("Failed to fetch temperature observations: {}", e),
            }
            e.status_code()
        })?;

    info!("Retrieved {} temperature observations", temperatures.len());
    Ok(Json(temperatures))
}

/// Min, average and max temperature per date from `start` onward
#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    tag = "climate",
    params(("start" = String, Path, description = "Start date, YYYY-MM-DD (compared as text, not validated)")),
    responses(
        (status = 200, description = "JSON array of [date, min, avg, max] arrays"),
        (status = 503, description = "Observation store unavailable")
    )
)]
#[instrument(skip(state), fields(start = %start))]
async fn temperature_stats_from(
    State(state): State<AppState>,
    Path(start): Path<String>,
) -> Result<Json<Vec<DailyTemperatureStats>>, StatusCode> {
    debug!("Fetching temperature stats from {}", start);
    let stats = state
        .climate_service
        .temperature_stats_from(&start)
        .await
        .map_err(|e| {
            error!("Failed to fetch temperature stats from {}: {}", start, e);
            e.status_code()
        })?;

    info!("Retrieved temperature stats for {} dates from {}", stats.len(), start);
    Ok(Json(stats))
}

/// Min, average and max temperature per date between `start` and `end`, inclusive
#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    tag = "climate",
    params(
        ("start" = String, Path, description = "Start date, YYYY-MM-DD (compared as text, not validated)"),
        ("end" = String, Path, description = "End date, YYYY-MM-DD, inclusive")
    ),
    responses(
        (status = 200, description = "JSON array of [date, min, avg, max] arrays"),
        (status = 503, description = "Observation store unavailable")
    )
)]
#[instrument(skip(state), fields(start = %start, end = %end))]
async fn temperature_stats_between(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Vec<DailyTemperatureStats>>, StatusCode> {
    debug!("Fetching temperature stats from {} to {}", start, end);
    let stats = state
        .climate_service
        .temperature_stats_between(&start, &end)
        .await
        .map_err(|e| {
            error!(
                "Failed to fetch temperature stats from {} to {}: {}",
                start, end, e
            );
            e.status_code()
        })?;

    info!(
        "Retrieved temperature stats for {} dates from {} to {}",
        stats.len(),
        start,
        end
    );
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_lists_routes() {
        let routes: Vec<&str> = HOME_PAGE
            .trim_start_matches("Available Routes:<br/>")
            .split("<br/>")
            .collect();
        assert_eq!(
            routes,
            vec![
                "/api/v1.0/precipitation",
                "/api/v1.0/stations",
                "/api/v1.0/tobs",
                "/api/v1.0/2016-07-30",
                "/api/v1.0/2017-07-29/2017-08-06",
            ]
        );
    }

    #[test]
    fn test_openapi_documents_every_route() {
        let spec = generate_openapi_spec();
        for path in [
            "/",
            "/api/v1.0/precipitation",
            "/api/v1.0/stations",
            "/api/v1.0/tobs",
            "/api/v1.0/{start}",
            "/api/v1.0/{start}/{end}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
