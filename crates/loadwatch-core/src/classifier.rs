//! Load classification of the trailing status window.
//!
//! [`classify`] labels the newest slice of a sample sequence as
//! [`Classification::Normal`], [`Classification::High`], or
//! [`Classification::Mixed`]. The slice is every sample whose timestamp is
//! at or after `latest.timestamp - window_ms`.
//!
//! Classification is recomputed from the whole sequence on every call.
//!
//! The classifier only slices; it does not enforce retention. Callers
//! pass whatever the retention window currently holds.

use loadwatch_types::{Classification, HIGH_LOAD_THRESHOLD, Sample};

/// Convert a window length in milliseconds to a timestamp offset.
///
/// Windows longer than `i64::MAX` milliseconds saturate.
pub fn window_offset(window_ms: u64) -> i64 {
    i64::try_from(window_ms).unwrap_or(i64::MAX)
}

/// First timestamp (inclusive) that belongs to the window ending at
/// `latest`.
pub fn window_start(latest: i64, window_ms: u64) -> i64 {
    latest.saturating_sub(window_offset(window_ms))
}

/// Samples inside the trailing window of `samples`.
///
/// Empty when `samples` is empty. An out-of-order sequence still yields
/// every qualifying sample.
pub fn recent(samples: &[Sample], window_ms: u64) -> impl Iterator<Item = &Sample> {
    let start = samples
        .last()
        .map_or(i64::MAX, |latest| window_start(latest.timestamp, window_ms));
    samples.iter().filter(move |s| s.timestamp >= start)
}

/// Classify the trailing `window_ms` of `samples`.
///
/// - empty sequence: `Normal`
/// - every recent value `> 1`: `High`
/// - every recent value `<= 1`: `Normal`
/// - anything else: `Mixed`
///
/// A `NaN` value satisfies neither comparison and therefore makes the
/// window `Mixed`.
pub fn classify(samples: &[Sample], window_ms: u64) -> Classification {
    if samples.is_empty() {
        return Classification::Normal;
    }

    let mut any = false;
    let mut all_high = true;
    let mut all_normal = true;

    for sample in recent(samples, window_ms) {
        any = true;
        all_high &= sample.value > HIGH_LOAD_THRESHOLD;
        all_normal &= sample.value <= HIGH_LOAD_THRESHOLD;
    }

    if any && all_high {
        Classification::High
    } else if any && all_normal {
        Classification::Normal
    } else {
        Classification::Mixed
    }
}
