use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::db::DbPool;
use crate::services::ClimateService;

/// The running HTTP server
///
/// The store is read-only and nothing runs in the background, so the server
/// task is the only handle to hold on to.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Wire the service over an open pool and start serving
    pub async fn build(config: Config, pool: DbPool) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let climate_service = ClimateService::new(pool);

        let app_state = AppState { climate_service };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Starting HTTP server on {}", listener.local_addr()?);

        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
