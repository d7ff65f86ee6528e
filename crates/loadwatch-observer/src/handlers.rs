//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`MonitorSnapshot`] via the
//! shared [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML dashboard |
//! | `GET` | `/api/system/status` | Latest normalized load average |
//! | `GET` | `/api/samples` | Retained samples |
//! | `GET` | `/api/status` | Classification, level, and engine state |
//! | `GET` | `/api/events` | Status event log |
//!
//! [`MonitorSnapshot`]: crate::state::MonitorSnapshot

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use loadwatch_types::{StatusEvent, StatusEventKind, SystemStatusResponse};

use crate::error::ObserverError;
use crate::state::AppState;

/// Shown in place of the event log before the first event.
pub const NO_EVENTS_TEXT: &str = "No status events recorded yet";

/// Default and maximum page size for `GET /api/events`.
const DEFAULT_EVENT_LIMIT: usize = 100;
const MAX_EVENT_LIMIT: usize = 1000;

/// Events listed on the HTML dashboard.
const DASHBOARD_EVENTS: usize = 10;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/samples`.
#[derive(Debug, serde::Deserialize)]
pub struct SamplesQuery {
    /// Only samples with `timestamp >= since` (epoch milliseconds).
    pub since: Option<i64>,
}

/// Query parameters for `GET /api/events`.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Filter by event type: `high` or `recovered`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Return only the newest `limit` events (default 100, max 1000).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML dashboard
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the current load and recent events.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let (load, level) = snapshot.latest().map_or_else(
        || ("--".to_owned(), "Waiting for data"),
        |s| (format!("{:.2}", s.value), s.level().text()),
    );
    let classification = format!("{:?}", snapshot.classification);
    let last_emitted = format!("{:?}", snapshot.engine_state.last_emitted_type);
    let sample_count = snapshot.samples.len();
    let event_count = snapshot.events.len();

    let mut event_rows = String::new();
    for event in snapshot.events.all().iter().rev().take(DASHBOARD_EVENTS) {
        let _ = writeln!(
            event_rows,
            "        <li><b>{}</b> at {} -- {}</li>",
            event.kind.title(),
            event.timestamp,
            event.kind.message()
        );
    }
    if event_rows.is_empty() {
        event_rows = format!("        <li class=\"empty\">{NO_EVENTS_TEXT}</li>\n");
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Loadwatch</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        .empty {{ color: #8b949e; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ padding-left: 1.2rem; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Loadwatch</h1>
    <p class="subtitle">CPU load average monitor</p>

    <div>
        <div class="metric">
            <div class="label">Load average</div>
            <div class="value">{load}</div>
        </div>
        <div class="metric">
            <div class="label">Current</div>
            <div class="value">{level}</div>
        </div>
        <div class="metric">
            <div class="label">Window</div>
            <div class="value">{classification}</div>
        </div>
        <div class="metric">
            <div class="label">Last event</div>
            <div class="value">{last_emitted}</div>
        </div>
    </div>

    <p>{sample_count} samples retained, {event_count} status events.</p>

    <h2>Event log</h2>
    <ul>
{event_rows}    </ul>

    <h2>API</h2>
    <ul>
        <li><a href="/api/system/status">/api/system/status</a></li>
        <li><a href="/api/samples">/api/samples</a> (?since=ms)</li>
        <li><a href="/api/status">/api/status</a></li>
        <li><a href="/api/events">/api/events</a> (?type=high|recovered, ?limit=N)</li>
        <li><a href="/api/alerts">/api/alerts</a></li>
        <li><a href="/api/operator/status">/api/operator/status</a></li>
        <li><code>ws://host:port/ws/status</code></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/system/status -- latest load average
// ---------------------------------------------------------------------------

/// Return the latest normalized 1-minute load average.
///
/// `loadAverage` is `null` until the first successful poll.
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatusResponse> {
    let snapshot = state.snapshot.read().await;
    Json(SystemStatusResponse {
        load_average: snapshot.latest().map(|s| s.value),
    })
}

// ---------------------------------------------------------------------------
// GET /api/samples -- retained samples
// ---------------------------------------------------------------------------

/// List retained samples, oldest first.
///
/// # Query Parameters
///
/// - `since`: only samples at or after this epoch-millisecond timestamp.
pub async fn list_samples(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SamplesQuery>,
) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let since = params.since.unwrap_or(i64::MIN);

    let samples: Vec<_> = snapshot
        .samples
        .iter()
        .filter(|s| s.timestamp >= since)
        .collect();

    Json(serde_json::json!({
        "count": samples.len(),
        "retentionMs": snapshot.settings.retention_ms,
        "spanMs": snapshot.span_ms,
        "samples": samples,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/status -- classification and engine state
// ---------------------------------------------------------------------------

/// Return the status-window classification, the current load level, and
/// the hysteresis state.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let latest = snapshot.latest();
    let level = latest.map(loadwatch_types::Sample::level);

    Json(serde_json::json!({
        "classification": snapshot.classification,
        "level": level,
        "levelText": level.map(|l| l.text()),
        "latest": latest,
        "engineState": snapshot.engine_state,
        "lastEvent": snapshot.events.latest(),
        "lastError": snapshot.last_error,
        "statusWindowMs": snapshot.settings.status_window_ms,
        "retentionMs": snapshot.settings.retention_ms,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/events -- event log
// ---------------------------------------------------------------------------

/// List status events in emission order.
///
/// # Query Parameters
///
/// - `type`: `high` | `recovered`
/// - `limit`: keep only the newest N matches (default 100, max 1000)
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let kind = params.kind.as_deref().map(parse_kind).transpose()?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .min(MAX_EVENT_LIMIT);

    let snapshot = state.snapshot.read().await;
    let matching: Vec<&StatusEvent> = match kind {
        Some(kind) => snapshot.events.of_kind(kind).collect(),
        None => snapshot.events.all().iter().collect(),
    };
    let skip = matching.len().saturating_sub(limit);
    let events = matching.get(skip..).unwrap_or_default();

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "total": snapshot.events.len(),
        "events": events,
        "emptyText": events.is_empty().then_some(NO_EVENTS_TEXT),
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an event type filter.
fn parse_kind(s: &str) -> Result<StatusEventKind, ObserverError> {
    match s {
        "high" => Ok(StatusEventKind::High),
        "recovered" => Ok(StatusEventKind::Recovered),
        other => Err(ObserverError::InvalidQuery(format!(
            "type must be high or recovered, got {other:?}"
        ))),
    }
}
