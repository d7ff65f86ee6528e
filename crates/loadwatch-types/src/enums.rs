//! Enumeration types for the Loadwatch load monitor.
//!
//! Wire names are lowercase so the dashboard can match on the same
//! strings it renders (`"high"`, `"recovered"`, `"mixed"`, ...).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Load level of the trailing status window.
///
/// Derived from the sample sequence on every evaluation and never
/// stored:
/// - `Normal`: every recent sample is at or below the high-load threshold
/// - `High`: every recent sample is above the high-load threshold
/// - `Mixed`: the recent samples straddle the threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Classification {
    /// All recent samples are `<= 1`.
    #[default]
    Normal,
    /// All recent samples are `> 1`.
    High,
    /// Recent samples fall on both sides of the threshold.
    Mixed,
}

// ---------------------------------------------------------------------------
// Status events
// ---------------------------------------------------------------------------

/// The kind of a status event written to the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum StatusEventKind {
    /// The host has been under high load for a full status window.
    High,
    /// The host returned to normal load after a `High` event.
    Recovered,
}

impl StatusEventKind {
    /// Short title shown for the event in the dashboard.
    pub const fn title(self) -> &'static str {
        match self {
            Self::High => "High Load",
            Self::Recovered => "Recovered",
        }
    }

    /// Longer explanation shown alongside the title.
    pub const fn message(self) -> &'static str {
        match self {
            Self::High => {
                "Caution! The CPU has been under high load for an extended period of time."
            }
            Self::Recovered => {
                "The CPU has recovered from a period of high load and has returned to normal."
            }
        }
    }
}

impl core::fmt::Display for StatusEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Recovered => f.write_str("recovered"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// The type of the most recently emitted status event.
///
/// `None` until the first event fires. Hysteresis is decided against
/// this value alone; the event log is never re-scanned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LastEmitted {
    /// No event has been emitted yet.
    #[default]
    None,
    /// The last event was [`StatusEventKind::High`].
    High,
    /// The last event was [`StatusEventKind::Recovered`].
    Recovered,
}

impl From<StatusEventKind> for LastEmitted {
    fn from(kind: StatusEventKind) -> Self {
        match kind {
            StatusEventKind::High => Self::High,
            StatusEventKind::Recovered => Self::Recovered,
        }
    }
}

// ---------------------------------------------------------------------------
// Load level (single sample)
// ---------------------------------------------------------------------------

/// Load level of a single sample, used for the "current load" badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LoadLevel {
    /// The sample is at or below the threshold.
    Normal,
    /// The sample is above the threshold.
    High,
}

impl LoadLevel {
    /// Display text for the level.
    pub const fn text(self) -> &'static str {
        match self {
            Self::Normal => "Normal Load",
            Self::High => "High Load",
        }
    }
}
