//! Single-writer host for the event engine.
//!
//! A [`Monitor`] owns the retention window, the hysteresis state, and the
//! event log. Every sample goes through [`Monitor::record`], which makes
//! the monitor the only writer of engine state. Run it from one task and
//! publish copies of its state to readers.

use loadwatch_types::{Classification, EngineState, Sample, StatusEvent, StatusEventKind};
use tracing::{debug, info, warn};

use crate::classifier::classify;
use crate::config::MonitorConfig;
use crate::event_log::EventLog;
use crate::machine::EventEngine;
use crate::window::SampleWindow;

/// Window durations for a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Sustained duration required to emit or clear an event.
    pub status_window_ms: u64,
    /// Trailing duration of samples kept.
    pub retention_ms: u64,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            status_window_ms: config.status_window_ms,
            retention_ms: config.retention_ms,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

/// What one recorded sample changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorUpdate {
    /// The sample that was recorded.
    pub sample: Sample,
    /// Classification of the trailing status window after recording.
    pub classification: Classification,
    /// Event emitted by this sample, if any.
    pub event: Option<StatusEvent>,
    /// Engine state after recording.
    pub state: EngineState,
    /// Samples evicted from the retention window.
    pub evicted: usize,
}

/// Retention window plus event engine, driven one sample at a time.
#[derive(Debug, Clone)]
pub struct Monitor {
    settings: MonitorSettings,
    window: SampleWindow,
    engine: EventEngine,
}

impl Monitor {
    /// Create a monitor with an empty window and a fresh engine.
    pub const fn new(settings: MonitorSettings) -> Self {
        Self {
            settings,
            window: SampleWindow::new(settings.retention_ms),
            engine: EventEngine::new(settings.status_window_ms),
        }
    }

    /// Record a sample: retain it, classify, and evaluate.
    pub fn record(&mut self, sample: Sample) -> MonitorUpdate {
        let evicted = self.window.push(sample);
        let evaluation = self.engine.observe(self.window.samples());

        debug!(
            timestamp = sample.timestamp,
            value = sample.value,
            classification = ?evaluation.classification,
            retained = self.window.len(),
            evicted,
            "Sample recorded"
        );

        if let Some(event) = evaluation.event {
            match event.kind {
                StatusEventKind::High => warn!(
                    timestamp = event.timestamp,
                    window_ms = self.settings.status_window_ms,
                    "{}",
                    event.kind.message()
                ),
                StatusEventKind::Recovered => info!(
                    timestamp = event.timestamp,
                    "{}",
                    event.kind.message()
                ),
            }
        }

        MonitorUpdate {
            sample,
            classification: evaluation.classification,
            event: evaluation.event,
            state: evaluation.state,
            evicted,
        }
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> &[Sample] {
        self.window.samples()
    }

    /// Newest retained sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.window.latest()
    }

    /// Time between the oldest and newest retained sample.
    pub fn span_ms(&self) -> i64 {
        self.window.span_ms()
    }

    /// Every event emitted so far.
    pub fn events(&self) -> &EventLog {
        self.engine.log()
    }

    /// Current hysteresis state.
    pub const fn state(&self) -> &EngineState {
        self.engine.state()
    }

    /// Classification of the current trailing status window.
    pub fn classification(&self) -> Classification {
        classify(self.window.samples(), self.settings.status_window_ms)
    }

    /// Configured window durations.
    pub const fn settings(&self) -> MonitorSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDataPoints;
    use loadwatch_types::LastEmitted;

    fn settings() -> MonitorSettings {
        MonitorSettings {
            status_window_ms: 120_000,
            retention_ms: 600_000,
        }
    }

    #[test]
    fn fresh_monitor() {
        let monitor = Monitor::new(settings());
        assert!(monitor.samples().is_empty());
        assert!(monitor.events().is_empty());
        assert_eq!(monitor.span_ms(), 0);
        assert_eq!(monitor.classification(), Classification::Normal);
        assert_eq!(monitor.state().last_emitted_type, LastEmitted::None);
        assert_eq!(monitor.settings(), settings());
    }

    #[test]
    fn default_settings_match_reference_windows() {
        let s = MonitorSettings::default();
        assert_eq!(s.status_window_ms, 120_000);
        assert_eq!(s.retention_ms, 600_000);
    }

    #[test]
    fn records_full_cycle() {
        let data = TestDataPoints::generate(5);
        let mut monitor = Monitor::new(settings());
        let mut emitted = Vec::new();
        for sample in data.transitions.normal_to_high_to_normal.iter().flatten() {
            let update = monitor.record(*sample);
            assert_eq!(update.sample, *sample);
            if let Some(event) = update.event {
                emitted.push(event.kind);
            }
        }
        assert_eq!(
            emitted,
            vec![StatusEventKind::High, StatusEventKind::Recovered]
        );
        assert_eq!(monitor.events().len(), 2);
        assert_eq!(monitor.state().last_emitted_type, LastEmitted::Recovered);
        assert_eq!(monitor.classification(), Classification::Normal);
    }

    #[test]
    fn retention_bounds_history() {
        let mut monitor = Monitor::new(MonitorSettings {
            status_window_ms: 20,
            retention_ms: 50,
        });
        let mut evicted = 0;
        for t in 0..20 {
            evicted += monitor.record(Sample::new(t * 10, 0.5)).evicted;
        }
        // Timestamps 140..=190 remain.
        assert_eq!(monitor.samples().len(), 6);
        assert_eq!(monitor.span_ms(), 50);
        assert_eq!(evicted, 14);
        assert_eq!(monitor.latest().map(|s| s.timestamp), Some(190));
    }

    #[test]
    fn high_load_after_retention_churn_fires_once() {
        let mut monitor = Monitor::new(MonitorSettings {
            status_window_ms: 30,
            retention_ms: 60,
        });
        let mut highs = 0;
        for t in 0..50 {
            if monitor.record(Sample::new(t * 10, 4.0)).event.is_some() {
                highs += 1;
            }
        }
        assert_eq!(highs, 1);
        assert_eq!(
            monitor.events().latest().map(|e| e.timestamp),
            Some(30)
        );
    }
}
