//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for per-poll status messages,
//! an in-memory [`MonitorSnapshot`] that the REST endpoints serve, the
//! alert store, and the poll-loop controls. The poll loop is the only
//! writer of the monitor; it publishes copies here after every poll.

use std::sync::Arc;

use loadwatch_core::Monitor;
use loadwatch_core::control::MonitorControl;
use loadwatch_core::event_log::EventLog;
use loadwatch_core::monitor::MonitorSettings;
use loadwatch_types::{Classification, EngineState, LoadLevel, Sample, StatusEvent};
use tokio::sync::{RwLock, broadcast};

use crate::alerts::AlertStore;

/// Capacity of the broadcast channel for status messages.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON message pushed over `/ws/status` after every successful poll.
///
/// A client also receives one on connect, built from the snapshot, with
/// `event` left empty.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBroadcast {
    /// The sample just recorded.
    pub sample: Sample,
    /// Load level of that sample.
    pub level: LoadLevel,
    /// Classification of the trailing status window.
    pub classification: Classification,
    /// Event emitted by this poll, if any.
    pub event: Option<StatusEvent>,
    /// Engine state after the poll.
    pub engine_state: EngineState,
    /// Samples currently retained.
    pub retained: usize,
}

/// In-memory copy of the monitor served by the REST endpoints.
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    /// Retained samples, oldest first.
    pub samples: Vec<Sample>,
    /// Every event emitted so far, oldest first.
    pub events: EventLog,
    /// Time between the oldest and newest retained sample.
    pub span_ms: i64,
    /// Classification of the trailing status window.
    pub classification: Classification,
    /// Current hysteresis state.
    pub engine_state: EngineState,
    /// Last source failure, cleared by the next good reading.
    pub last_error: Option<String>,
    /// Window durations the monitor runs with.
    pub settings: MonitorSettings,
}

impl MonitorSnapshot {
    /// Empty snapshot for a monitor with the given settings.
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Copy the current state of `monitor`.
    pub fn capture(monitor: &Monitor) -> Self {
        Self {
            samples: monitor.samples().to_vec(),
            events: monitor.events().clone(),
            span_ms: monitor.span_ms(),
            classification: monitor.classification(),
            engine_state: *monitor.state(),
            last_error: None,
            settings: monitor.settings(),
        }
    }

    /// Newest retained sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Current status as a broadcast message, `None` before the first sample.
    pub fn status_message(&self) -> Option<StatusBroadcast> {
        let sample = *self.latest()?;
        Some(StatusBroadcast {
            sample,
            level: sample.level(),
            classification: self.classification,
            event: None,
            engine_state: self.engine_state,
            retained: self.samples.len(),
        })
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for status messages.
    pub tx: broadcast::Sender<StatusBroadcast>,
    /// The current monitor snapshot (updated each poll).
    pub snapshot: Arc<RwLock<MonitorSnapshot>>,
    /// Alerts raised for status events.
    pub alert_store: Arc<RwLock<AlertStore>>,
    /// Poll-loop controls (present when the loop is running).
    pub control: Option<Arc<MonitorControl>>,
}

impl AppState {
    /// Create a new application state with an empty snapshot.
    pub fn new() -> Self {
        Self::build(MonitorSettings::default(), None)
    }

    /// Create a new application state with poll-loop controls attached.
    pub fn with_control(settings: MonitorSettings, control: Arc<MonitorControl>) -> Self {
        Self::build(settings, Some(control))
    }

    fn build(settings: MonitorSettings, control: Option<Arc<MonitorControl>>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(MonitorSnapshot::new(settings))),
            alert_store: Arc::new(RwLock::new(AlertStore::new())),
            control,
        }
    }

    /// Subscribe to the status broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a status message to all connected clients.
    ///
    /// Returns the number of receivers, 0 when no client is connected.
    pub fn broadcast(&self, message: &StatusBroadcast) -> usize {
        self.tx.send(message.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
