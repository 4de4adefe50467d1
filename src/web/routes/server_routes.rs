//! Dashboard endpoints for configuring and monitoring a single server.
//!
//! The dashboard operates on the fixed `web-dashboard` tenant; config
//! changes restart or stop its monitor so the stored flag and the running
//! timer never disagree.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::storage::{ServerConfig, ServerStatus};
use crate::web::{AppError, AppState, DASHBOARD_GUILD_ID};

pub fn create_server_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/config", get(get_config).post(save_config))
        .route("/status", get(get_status))
        .route("/check", post(check_server))
        .route("/monitor", post(control_monitor))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigRequest {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auto_monitor: bool,
}

fn default_port() -> u16 {
    25565
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorAction {
    Start,
    Stop,
}

#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    pub action: MonitorAction,
}

#[axum::debug_handler]
async fn save_config(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SaveConfigRequest>,
) -> Result<Json<ServerConfig>, AppError> {
    let host = payload.host.trim().to_string();
    if host.is_empty() {
        return Err(AppError::InvalidInput("Server host is required".to_string()));
    }
    if payload.port == 0 {
        return Err(AppError::InvalidInput(
            "Port must be between 1 and 65535".to_string(),
        ));
    }

    // Tear down any running monitor before the target changes.
    app_state.monitor.stop(DASHBOARD_GUILD_ID).await;

    let config = app_state.storage.save_config(ServerConfig {
        guild_id: DASHBOARD_GUILD_ID.to_string(),
        host,
        port: payload.port,
        auto_monitor: payload.auto_monitor,
    });

    if config.auto_monitor {
        app_state
            .monitor
            .start(DASHBOARD_GUILD_ID, &config.host, config.port)
            .await;
    }

    Ok(Json(config))
}

#[axum::debug_handler]
async fn get_config(
    State(app_state): State<Arc<AppState>>,
) -> Json<Option<ServerConfig>> {
    Json(app_state.storage.get_config(DASHBOARD_GUILD_ID))
}

#[axum::debug_handler]
async fn get_status(
    State(app_state): State<Arc<AppState>>,
) -> Json<Option<ServerStatus>> {
    Json(app_state.storage.get_status(DASHBOARD_GUILD_ID))
}

#[axum::debug_handler]
async fn check_server(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ServerStatus>, AppError> {
    let config = app_state
        .storage
        .get_config(DASHBOARD_GUILD_ID)
        .ok_or_else(|| {
            AppError::InvalidInput(
                "Server not configured. Please configure server first.".to_string(),
            )
        })?;

    let status = app_state
        .monitor
        .check_once(DASHBOARD_GUILD_ID, &config.host, config.port)
        .await;
    Ok(Json(status))
}

#[axum::debug_handler]
async fn control_monitor(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<MonitorRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let config = app_state
        .storage
        .get_config(DASHBOARD_GUILD_ID)
        .ok_or_else(|| {
            AppError::InvalidInput(
                "Server not configured. Please configure server first.".to_string(),
            )
        })?;

    match payload.action {
        MonitorAction::Start => {
            app_state.storage.save_config(ServerConfig {
                auto_monitor: true,
                ..config.clone()
            });
            app_state
                .monitor
                .start(DASHBOARD_GUILD_ID, &config.host, config.port)
                .await;
            Ok(Json(serde_json::json!({
                "message": "Auto-monitoring started",
                "monitoring": true
            })))
        }
        MonitorAction::Stop => {
            app_state.monitor.stop(DASHBOARD_GUILD_ID).await;
            app_state.storage.save_config(ServerConfig {
                auto_monitor: false,
                ..config
            });
            Ok(Json(serde_json::json!({
                "message": "Auto-monitoring stopped",
                "monitoring": false
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::monitor::MonitorManager;
    use crate::probe::{ProbeOutcome, Prober};
    use crate::storage::{MemStorage, Storage};
    use crate::web::create_axum_router;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    struct OnlineProber;

    #[async_trait]
    impl Prober for OnlineProber {
        async fn probe(&self, _host: &str, _port: u16) -> ProbeOutcome {
            ProbeOutcome {
                online: true,
                player_count: 7,
                max_players: 50,
                version: Some("1.21".to_string()),
                motd: Some("welcome".to_string()),
                player_names: Some(vec![]),
            }
        }
    }

    fn test_app() -> (Arc<MemStorage>, Arc<MonitorManager>, axum::Router) {
        let storage = Arc::new(MemStorage::new());
        let config = Arc::new(AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            monitor_interval: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(5),
        });
        let monitor = Arc::new(MonitorManager::new(
            storage.clone(),
            Arc::new(OnlineProber),
            config.monitor_interval,
        ));
        let router = create_axum_router(storage.clone(), monitor.clone(), config);
        (storage, monitor, router)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let (_, _, app) = test_app();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn config_and_status_read_as_null_when_absent() {
        let (_, _, app) = test_app();

        let response = app
            .clone()
            .oneshot(Request::get("/api/server/config").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::Value::Null);

        let response = app
            .oneshot(Request::get("/api/server/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn save_config_round_trips_through_the_api() {
        let (_, monitor, app) = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "play.example.net", "port": 25565}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let saved = body_json(response).await;
        assert_eq!(saved["guildId"], "web-dashboard");
        assert_eq!(saved["host"], "play.example.net");
        assert_eq!(saved["autoMonitor"], false);
        assert!(!monitor.is_monitoring(DASHBOARD_GUILD_ID).await);

        let response = app
            .oneshot(Request::get("/api/server/config").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, saved);
    }

    #[tokio::test]
    async fn save_config_with_auto_monitor_starts_the_timer() {
        let (storage, monitor, app) = test_app();

        let response = app
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "play.example.net", "autoMonitor": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(monitor.is_monitoring(DASHBOARD_GUILD_ID).await);
        // The immediate probe was recorded before the response.
        assert!(storage.get_status(DASHBOARD_GUILD_ID).is_some());
        monitor.stop_all().await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_the_scheduler() {
        let (storage, monitor, app) = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "   ", "port": 25565}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "play.example.net", "port": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(storage.get_config(DASHBOARD_GUILD_ID).is_none());
        assert!(!monitor.is_monitoring(DASHBOARD_GUILD_ID).await);
    }

    #[tokio::test]
    async fn check_requires_a_config() {
        let (_, _, app) = test_app();
        let response = app
            .oneshot(
                Request::post("/api/server/check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn check_records_and_returns_a_snapshot() {
        let (storage, _, app) = test_app();
        app.clone()
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "play.example.net"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::post("/api/server/check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["playerCount"], 7);
        assert_eq!(body["maxPlayers"], 50);
        assert!(storage.get_status(DASHBOARD_GUILD_ID).is_some());
    }

    #[tokio::test]
    async fn monitor_actions_toggle_timer_and_flag() {
        let (storage, monitor, app) = test_app();
        app.clone()
            .oneshot(json_request(
                "/api/server/config",
                serde_json::json!({"host": "play.example.net"}),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "/api/server/monitor",
                serde_json::json!({"action": "start"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["monitoring"], true);
        assert!(monitor.is_monitoring(DASHBOARD_GUILD_ID).await);
        assert!(storage.get_config(DASHBOARD_GUILD_ID).unwrap().auto_monitor);

        let response = app
            .oneshot(json_request(
                "/api/server/monitor",
                serde_json::json!({"action": "stop"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["monitoring"], false);
        assert!(!monitor.is_monitoring(DASHBOARD_GUILD_ID).await);
        assert!(!storage.get_config(DASHBOARD_GUILD_ID).unwrap().auto_monitor);
    }

    #[tokio::test]
    async fn unknown_monitor_action_is_a_bad_request() {
        let (_, _, app) = test_app();
        let response = app
            .oneshot(json_request(
                "/api/server/monitor",
                serde_json::json!({"action": "pause"}),
            ))
            .await
            .unwrap();
        // serde rejects the unknown enum variant during extraction.
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
