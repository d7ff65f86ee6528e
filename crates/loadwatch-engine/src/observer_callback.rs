//! Poll callback that updates the Observer API state.
//!
//! After each poll, this callback broadcasts a [`StatusBroadcast`] to all
//! connected `WebSocket` clients, refreshes the in-memory
//! [`MonitorSnapshot`], and raises alerts for new status events.

use std::sync::Arc;

use loadwatch_core::Monitor;
use loadwatch_core::monitor::MonitorUpdate;
use loadwatch_core::runner::MonitorCallback;
use loadwatch_core::source::SourceError;
use loadwatch_observer::state::{AppState, MonitorSnapshot, StatusBroadcast};
use tracing::debug;

/// Callback that bridges the poll loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Publish the final monitor state, waiting for the locks.
    ///
    /// Run once after the poll loop returns so an update skipped by
    /// `try_write` on the last poll still reaches the API.
    pub async fn flush(&self, monitor: &Monitor) {
        let raised = self
            .state
            .alert_store
            .write()
            .await
            .sync_events(monitor.events().all());

        let mut snap = self.state.snapshot.write().await;
        let last_error = snap.last_error.take();
        *snap = MonitorSnapshot::capture(monitor);
        snap.last_error = last_error;
        drop(snap);

        debug!(raised, retained = monitor.samples().len(), "Final state published");
    }
}

impl MonitorCallback for ObserverCallback {
    fn on_sample(&mut self, update: &MonitorUpdate, monitor: &Monitor) {
        let broadcast = StatusBroadcast {
            sample: update.sample,
            level: update.sample.level(),
            classification: update.classification,
            event: update.event,
            engine_state: update.state,
            retained: monitor.samples().len(),
        };
        let receivers = self.state.broadcast(&broadcast);
        debug!(timestamp = update.sample.timestamp, receivers, "Status broadcast sent");

        // try_write keeps the poll loop from waiting on readers. A skipped
        // update is caught up on the next poll since both copies are taken
        // from the full monitor state.
        if let Ok(mut alerts) = self.state.alert_store.try_write() {
            let raised = alerts.sync_events(monitor.events().all());
            if raised > 0 {
                debug!(raised, "Alerts raised");
            }
        }
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            *snap = MonitorSnapshot::capture(monitor);
        }
    }

    fn on_source_error(&mut self, error: &SourceError) {
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            snap.last_error = Some(error.to_string());
        }
    }
}
