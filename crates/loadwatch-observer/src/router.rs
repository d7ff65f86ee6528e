//! Axum router construction for the Observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{alerts, handlers, operator, ws};

/// Build the complete Axum router for the Observer server.
///
/// CORS allows any origin so a separately served dashboard can poll
/// `/api/system/status`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/status", get(ws::ws_status))
        // Monitor
        .route("/api/system/status", get(handlers::system_status))
        .route("/api/samples", get(handlers::list_samples))
        .route("/api/status", get(handlers::get_status))
        .route("/api/events", get(handlers::list_events))
        // Alerts
        .route("/api/alerts", get(alerts::list_alerts))
        .route(
            "/api/alerts/{id}/acknowledge",
            post(alerts::acknowledge_alert),
        )
        // Operator
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/interval", post(operator::set_interval))
        .route("/api/operator/status", get(operator::status))
        .route("/api/operator/stop", post(operator::stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
