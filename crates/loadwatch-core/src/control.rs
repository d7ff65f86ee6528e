//! Runtime control state for the poll loop.
//!
//! Shared between the poll task and the observer's operator endpoints.
//! All mutable control fields are atomics so the poll loop reads them
//! without taking a lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::{MIN_POLL_INTERVAL_MS, MonitorConfig};

/// Why the poll loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorEndReason {
    /// Reached the configured `max_polls`.
    MaxPollsReached,
    /// An operator issued a stop command.
    OperatorStop,
}

/// Shared poll-loop control state.
#[derive(Debug)]
pub struct MonitorControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    stop_notify: Notify,
    poll_interval_ms: AtomicU64,
    polls: AtomicU64,
    started_at: DateTime<Utc>,
    max_polls: u64,
    end_reason: Mutex<Option<MonitorEndReason>>,
}

impl MonitorControl {
    /// Create control state from the monitor configuration.
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_limits(config.poll_interval_ms, config.max_polls)
    }

    /// Create control state from explicit values.
    pub fn with_limits(poll_interval_ms: u64, max_polls: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            poll_interval_ms: AtomicU64::new(poll_interval_ms),
            polls: AtomicU64::new(0),
            started_at: Utc::now(),
            max_polls,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether polling is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause polling. The loop sleeps until resumed or stopped.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume polling and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until polling is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. Wakes a paused or sleeping loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolves once [`request_stop`](Self::request_stop) has been called.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }

    /// Record why the loop ended.
    pub async fn set_end_reason(&self, reason: MonitorEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Why the loop ended, if it has.
    pub async fn end_reason(&self) -> Option<MonitorEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Poll interval
    // -----------------------------------------------------------------------

    /// Current poll interval in milliseconds.
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms.load(Ordering::Acquire)
    }

    /// Set the poll interval. Must be at least [`MIN_POLL_INTERVAL_MS`].
    ///
    /// Returns the previous interval, or `None` if the value was rejected.
    pub fn set_poll_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_POLL_INTERVAL_MS {
            return None;
        }
        Some(self.poll_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Counters / bounds
    // -----------------------------------------------------------------------

    /// Count one completed poll and return the new total.
    pub fn record_poll(&self) -> u64 {
        self.polls.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Polls completed so far.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Acquire)
    }

    /// Whether `max_polls > 0` and that many polls have run.
    pub const fn poll_limit_reached(&self, polls: u64) -> bool {
        self.max_polls > 0 && polls >= self.max_polls
    }

    /// Configured poll limit (0 = unlimited).
    pub const fn max_polls(&self) -> u64 {
        self.max_polls
    }

    /// Seconds since the loop started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

/// JSON-serializable status of the poll loop for the operator API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// Whether polling is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Polls completed so far.
    pub polls: u64,
    /// Configured poll limit (0 = unlimited).
    pub max_polls: u64,
    /// Seconds since start.
    pub elapsed_seconds: u64,
    /// Why the loop ended, if it has.
    pub end_reason: Option<MonitorEndReason>,
    /// RFC 3339 start time.
    pub started_at: String,
}

impl MonitorControl {
    /// Snapshot the control state for reporting.
    pub async fn status(&self) -> MonitorStatus {
        MonitorStatus {
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            poll_interval_ms: self.poll_interval_ms(),
            polls: self.polls(),
            max_polls: self.max_polls,
            elapsed_seconds: self.elapsed_seconds(),
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_running() {
        let control = MonitorControl::with_limits(1000, 0);
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert_eq!(control.polls(), 0);
    }

    #[test]
    fn pause_and_resume() {
        let control = MonitorControl::with_limits(1000, 0);
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
    }

    #[test]
    fn set_poll_interval() {
        let control = MonitorControl::with_limits(1000, 0);
        assert_eq!(control.set_poll_interval_ms(2000), Some(1000));
        assert_eq!(control.poll_interval_ms(), 2000);
    }

    #[test]
    fn reject_sub_minimum_interval() {
        let control = MonitorControl::with_limits(1000, 0);
        assert!(control.set_poll_interval_ms(50).is_none());
        assert_eq!(control.poll_interval_ms(), 1000);
    }

    #[test]
    fn poll_limit() {
        let unlimited = MonitorControl::with_limits(1000, 0);
        assert!(!unlimited.poll_limit_reached(1_000_000));

        let bounded = MonitorControl::with_limits(1000, 3);
        assert!(!bounded.poll_limit_reached(2));
        assert!(bounded.poll_limit_reached(3));
        assert_eq!(bounded.record_poll(), 1);
        assert_eq!(bounded.polls(), 1);
    }

    #[tokio::test]
    async fn stop_wakes_paused_waiter() {
        let control = std::sync::Arc::new(MonitorControl::with_limits(1000, 0));
        control.pause();
        let waiter = {
            let control = std::sync::Arc::clone(&control);
            tokio::spawn(async move { control.wait_if_paused().await })
        };
        control.request_stop();
        assert!(waiter.await.is_ok());
        control.stopped().await;
    }

    #[tokio::test]
    async fn status_reports_end_reason() {
        let control = MonitorControl::new(&MonitorConfig::default());
        control.set_end_reason(MonitorEndReason::OperatorStop).await;
        let status = control.status().await;
        assert_eq!(status.end_reason, Some(MonitorEndReason::OperatorStop));
        assert_eq!(status.poll_interval_ms, 10_000);
        assert!(!status.started_at.is_empty());
    }
}
