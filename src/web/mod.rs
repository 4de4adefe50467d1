//! HTTP surface for the web dashboard.

use std::sync::Arc;

use axum::{Router, http::Method, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::monitor::MonitorManager;
use crate::storage::Storage;

pub mod error;
pub mod routes;

pub use error::AppError;

/// Tenant id the dashboard operates on. The dashboard manages a single
/// server, unlike the bot surface which is keyed by guild.
pub const DASHBOARD_GUILD_ID: &str = "web-dashboard";

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub monitor: Arc<MonitorManager>,
    pub config: Arc<AppConfig>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(
    storage: Arc<dyn Storage>,
    monitor: Arc<MonitorManager>,
    config: Arc<AppConfig>,
) -> Router {
    let app_state = Arc::new(AppState {
        storage,
        monitor,
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/server", routes::server_routes::create_server_router())
        .with_state(app_state)
        .layer(cors)
}
