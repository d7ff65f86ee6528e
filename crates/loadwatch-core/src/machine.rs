//! Hysteresis state machine for high-load / recovered events.
//!
//! # States
//!
//! `None` (initial) -> `High` <-> `Recovered`. There is no terminal state.
//!
//! | last emitted | classification | action |
//! |---|---|---|
//! | `None` / `Recovered` | `High` | emit `High` |
//! | `High` | `Normal` | emit `Recovered` |
//! | anything | anything else | nothing |
//!
//! Two guards run before the table, in order:
//!
//! 1. an empty sequence does nothing
//! 2. a sequence whose full span (`last - first`) is shorter than the
//!    status window does nothing
//!
//! The span guard uses the whole supplied sequence, not the classifier's
//! trailing slice: it decides when the engine has seen enough history to
//! act at all.
//!
//! The engine has no failure modes. Malformed input degrades to "no
//! action".

use loadwatch_types::{
    Classification, EngineState, LastEmitted, Sample, StatusEvent, StatusEventKind,
};

use crate::classifier::{classify, window_offset};
use crate::event_log::EventLog;

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Classification of the trailing status window.
    pub classification: Classification,
    /// The event emitted by this evaluation, if any.
    pub event: Option<StatusEvent>,
    /// Engine state after the evaluation.
    pub state: EngineState,
}

/// Whether `samples` spans at least one status window.
///
/// Negative spans (out-of-order input) never qualify.
pub fn has_enough_history(samples: &[Sample], window_ms: u64) -> bool {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => {
            last.timestamp.saturating_sub(first.timestamp) >= window_offset(window_ms)
        }
        _ => false,
    }
}

/// Apply one transition given an already computed classification.
///
/// Returns the emitted event (stamped with the newest sample's timestamp)
/// and the next state. When nothing is emitted the state is returned
/// unchanged.
pub fn evaluate_with(
    samples: &[Sample],
    classification: Classification,
    state: &EngineState,
    window_ms: u64,
) -> (Option<StatusEvent>, EngineState) {
    let Some(latest) = samples.last() else {
        return (None, *state);
    };
    if !has_enough_history(samples, window_ms) {
        return (None, *state);
    }

    let kind = match (classification, state.last_emitted_type) {
        (Classification::High, LastEmitted::None | LastEmitted::Recovered) => {
            StatusEventKind::High
        }
        (Classification::Normal, LastEmitted::High) => StatusEventKind::Recovered,
        _ => return (None, *state),
    };

    let event = StatusEvent {
        kind,
        timestamp: latest.timestamp,
    };
    (Some(event), EngineState::after(kind))
}

/// Classify the trailing window of `samples` and apply one transition.
pub fn evaluate(samples: &[Sample], state: &EngineState, window_ms: u64) -> Evaluation {
    let classification = classify(samples, window_ms);
    let (event, state) = evaluate_with(samples, classification, state, window_ms);
    Evaluation {
        classification,
        event,
        state,
    }
}

/// A running event engine: hysteresis state plus the append-only log.
///
/// Re-create the engine to reset it; there is no other way to clear the
/// state or the log.
#[derive(Debug, Clone)]
pub struct EventEngine {
    status_window_ms: u64,
    state: EngineState,
    log: EventLog,
}

impl EventEngine {
    /// Create an engine with an empty log.
    pub const fn new(status_window_ms: u64) -> Self {
        Self {
            status_window_ms,
            state: EngineState::new(),
            log: EventLog::new(),
        }
    }

    /// Evaluate a sequence snapshot and append any emitted event.
    pub fn observe(&mut self, samples: &[Sample]) -> Evaluation {
        let evaluation = evaluate(samples, &self.state, self.status_window_ms);
        if let Some(event) = evaluation.event {
            self.log.push(event);
        }
        self.state = evaluation.state;
        evaluation
    }

    /// Current hysteresis state.
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Every event emitted so far, oldest first.
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// Configured status window in milliseconds.
    pub const fn status_window_ms(&self) -> u64 {
        self.status_window_ms
    }
}
