//! Alerts raised for status events.
//!
//! Every emitted status event produces one alert carrying the event's
//! title and message, the way a dashboard pops a "New Status Event"
//! notice. Alerts stay until an operator acknowledges them.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/alerts` | List alerts |
//! | `POST` | `/api/alerts/{id}/acknowledge` | Acknowledge an alert |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use loadwatch_types::{StatusEvent, StatusEventKind};
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

/// Heading shown above every alert.
pub const ALERT_HEADING: &str = "New Status Event";

/// Hint shown below every alert.
pub const ALERT_HINT: &str = "Please check the event log for more details.";

/// Maximum alerts to keep in memory.
pub const MAX_ALERTS: usize = 500;

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// A single alert.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Alert {
    /// Unique alert identifier.
    pub id: Uuid,
    /// Kind of the event that raised the alert.
    pub event_kind: StatusEventKind,
    /// Timestamp of that event (epoch milliseconds).
    pub event_timestamp: i64,
    /// Event title, e.g. "High Load".
    pub title: String,
    /// Event message.
    pub message: String,
    /// Whether the operator has acknowledged this alert.
    pub acknowledged: bool,
    /// ISO 8601 timestamp when the alert was created.
    pub created_at: String,
}

impl Alert {
    /// Build an unacknowledged alert for `event`.
    pub fn for_event(event: &StatusEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            event_kind: event.kind,
            event_timestamp: event.timestamp,
            title: event.kind.title().to_owned(),
            message: event.kind.message().to_owned(),
            acknowledged: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alert Store
// ---------------------------------------------------------------------------

/// In-memory alert store.
#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    /// All alerts, newest first.
    alerts: Vec<Alert>,
    /// How many events of the monitor's log already have an alert.
    synced_events: usize,
}

impl AlertStore {
    /// Create a new empty alert store.
    pub const fn new() -> Self {
        Self {
            alerts: Vec::new(),
            synced_events: 0,
        }
    }

    /// Add an alert to the store.
    ///
    /// If the store exceeds [`MAX_ALERTS`], the oldest alert is removed.
    pub fn push(&mut self, alert: Alert) {
        self.alerts.insert(0, alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    /// Get all alerts, newest first.
    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    /// Acknowledge an alert by ID.
    ///
    /// Returns `false` if the ID was not found.
    pub fn acknowledge(&mut self, id: Uuid) -> bool {
        let Some(alert) = self.alerts.iter_mut().find(|alert| alert.id == id) else {
            return false;
        };
        alert.acknowledged = true;
        true
    }

    /// Number of alerts not yet acknowledged.
    pub fn unacknowledged(&self) -> usize {
        self.alerts.iter().filter(|a| !a.acknowledged).count()
    }

    /// Raise an alert for one event.
    pub fn raise_for_event(&mut self, event: &StatusEvent) {
        self.push(Alert::for_event(event));
    }

    /// Raise alerts for every event of the full log not yet alerted.
    ///
    /// `events` is the monitor's complete, append-only event log. Calling
    /// this after any number of skipped publications raises each missed
    /// event exactly once. Returns how many alerts were raised.
    pub fn sync_events(&mut self, events: &[StatusEvent]) -> usize {
        let fresh = events.get(self.synced_events..).unwrap_or_default();
        for event in fresh {
            self.raise_for_event(event);
        }
        self.synced_events = events.len().max(self.synced_events);
        fresh.len()
    }
}

// ---------------------------------------------------------------------------
// REST Handlers
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, serde::Deserialize)]
pub struct AlertsQuery {
    /// Filter by acknowledged status (`true` or `false`).
    pub acknowledged: Option<String>,
    /// Maximum number of alerts to return (default 100).
    pub limit: Option<usize>,
}

/// `GET /api/alerts` -- list alerts with optional filtering.
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let acknowledged_filter = match params.acknowledged.as_deref() {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(ObserverError::InvalidQuery(format!(
                "acknowledged must be true or false, got {other:?}"
            )));
        }
    };
    let limit = params.limit.unwrap_or(100).min(MAX_ALERTS);

    let alert_store = state.alert_store.read().await;
    let alerts: Vec<&Alert> = alert_store
        .all()
        .iter()
        .filter(|a| acknowledged_filter.is_none_or(|ack| a.acknowledged == ack))
        .take(limit)
        .collect();

    Ok(Json(serde_json::json!({
        "heading": ALERT_HEADING,
        "hint": ALERT_HINT,
        "count": alerts.len(),
        "unacknowledged": alert_store.unacknowledged(),
        "alerts": alerts,
    })))
}

/// `POST /api/alerts/{id}/acknowledge` -- acknowledge an alert.
pub async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| ObserverError::InvalidUuid(format!("{id_str}: {e}")))?;

    let mut alert_store = state.alert_store.write().await;
    if alert_store.acknowledge(id) {
        Ok(Json(serde_json::json!({
            "ok": true,
            "message": format!("Alert {id} acknowledged"),
        })))
    } else {
        Err(ObserverError::NotFound(format!("alert {id}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
