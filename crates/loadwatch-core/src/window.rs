//! Trailing retention window of load samples.
//!
//! The poller keeps only the samples taken within the last
//! `retention_ms`, measured from the newest sample. This bounds memory and
//! is what the classifier and state machine see on every tick.

use loadwatch_types::Sample;

use crate::classifier::window_start;

/// Samples retained for the trailing retention window.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    retention_ms: u64,
    samples: Vec<Sample>,
}

impl SampleWindow {
    /// Create an empty window.
    pub const fn new(retention_ms: u64) -> Self {
        Self {
            retention_ms,
            samples: Vec::new(),
        }
    }

    /// Append a sample and drop everything older than the retention
    /// window ending at that sample.
    ///
    /// Returns the number of samples evicted.
    pub fn push(&mut self, sample: Sample) -> usize {
        self.samples.push(sample);
        let cutoff = window_start(sample.timestamp, self.retention_ms);
        let before = self.samples.len();
        self.samples.retain(|s| s.timestamp >= cutoff);
        before.saturating_sub(self.samples.len())
    }

    /// The retained samples, oldest first.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The newest sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time between the oldest and newest retained sample.
    pub fn span_ms(&self) -> i64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => 0,
        }
    }

    /// Configured retention in milliseconds.
    pub const fn retention_ms(&self) -> u64 {
        self.retention_ms
    }
}
