//! Core record types: samples, status events, and engine state.
//!
//! All timestamps are Unix epoch milliseconds carried as `i64`. They are
//! exported to `TypeScript` as `number` because the dashboard compares
//! them against `Date.now()`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LastEmitted, LoadLevel, StatusEventKind};

/// Normalized load above which a sample counts as high load.
///
/// Fixed by the domain: a normalized 1-minute load average of 1 means
/// every CPU is busy.
pub const HIGH_LOAD_THRESHOLD: f64 = 1.0;

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One normalized load-average observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Sample {
    /// When the observation was taken (epoch milliseconds).
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Normalized 1-minute load average (load / CPU count).
    pub value: f64,
}

impl Sample {
    /// Create a sample.
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Whether this sample is above [`HIGH_LOAD_THRESHOLD`].
    pub fn is_high(&self) -> bool {
        self.value > HIGH_LOAD_THRESHOLD
    }

    /// Load level of this single sample.
    pub fn level(&self) -> LoadLevel {
        if self.is_high() {
            LoadLevel::High
        } else {
            LoadLevel::Normal
        }
    }
}

// ---------------------------------------------------------------------------
// Status event
// ---------------------------------------------------------------------------

/// A discrete transition recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatusEvent {
    /// Which transition occurred.
    #[serde(rename = "type")]
    pub kind: StatusEventKind,
    /// Timestamp of the newest sample at detection time.
    #[ts(type = "number")]
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// Hysteresis state of the event engine.
///
/// Exactly one instance exists per running engine. It only changes when
/// an event is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EngineState {
    /// Type of the most recently emitted event.
    pub last_emitted_type: LastEmitted,
}

impl EngineState {
    /// Fresh engine state: nothing emitted yet.
    pub const fn new() -> Self {
        Self {
            last_emitted_type: LastEmitted::None,
        }
    }

    /// State after emitting an event of the given kind.
    pub const fn after(kind: StatusEventKind) -> Self {
        let last_emitted_type = match kind {
            StatusEventKind::High => LastEmitted::High,
            StatusEventKind::Recovered => LastEmitted::Recovered,
        };
        Self { last_emitted_type }
    }
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

/// Body of `GET /api/system/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SystemStatusResponse {
    /// Normalized 1-minute CPU load average, absent before the first poll.
    pub load_average: Option<f64>,
}
