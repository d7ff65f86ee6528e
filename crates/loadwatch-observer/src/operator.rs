//! Operator REST API handlers for poll-loop control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause polling |
//! | `POST` | `/api/operator/resume` | Resume polling |
//! | `POST` | `/api/operator/interval` | Set the poll interval (ms) |
//! | `GET` | `/api/operator/status` | Poll-loop status |
//! | `POST` | `/api/operator/stop` | Stop the poll loop |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use loadwatch_core::config::MIN_POLL_INTERVAL_MS;
use loadwatch_core::control::MonitorControl;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Request body for `POST /api/operator/interval`.
#[derive(Debug, serde::Deserialize)]
pub struct SetIntervalRequest {
    /// New poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    /// Whether the operation succeeded.
    ok: bool,
    /// Human-readable message.
    message: String,
}

impl OperatorResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: true,
            message: message.into(),
        })
    }
}

fn control(state: &AppState) -> Result<&Arc<MonitorControl>, ObserverError> {
    state.control.as_ref().ok_or(ObserverError::ControlUnavailable)
}

/// `POST /api/operator/pause` -- pause polling.
///
/// Retained samples and engine state are kept; no samples are taken
/// until resumed.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    control(&state)?.pause();
    info!("Operator paused polling");
    Ok(OperatorResponse::ok("Polling paused"))
}

/// `POST /api/operator/resume` -- resume polling after a pause.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    control(&state)?.resume();
    info!("Operator resumed polling");
    Ok(OperatorResponse::ok("Polling resumed"))
}

/// `POST /api/operator/interval` -- change the poll interval.
///
/// Takes effect before the next sleep.
pub async fn set_interval(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetIntervalRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let previous = control(&state)?
        .set_poll_interval_ms(body.poll_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidQuery(format!(
                "poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}"
            ))
        })?;

    info!(
        previous_ms = previous,
        new_ms = body.poll_interval_ms,
        "Operator changed poll interval"
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Poll interval changed from {previous}ms to {}ms", body.poll_interval_ms),
        "previous_interval_ms": previous,
        "new_interval_ms": body.poll_interval_ms,
    })))
}

/// `GET /api/operator/status` -- current poll-loop status.
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let status = control(&state)?.status().await;
    Ok(Json(status))
}

/// `POST /api/operator/stop` -- stop the poll loop.
///
/// The loop wakes from any sleep or pause and ends. The HTTP server keeps
/// serving the last snapshot.
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    control(&state)?.request_stop();
    info!("Operator requested stop");
    Ok(OperatorResponse::ok("Stop requested"))
}
