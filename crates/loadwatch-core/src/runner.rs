//! Poll loop that feeds the monitor.
//!
//! [`run_monitor`] reads the load source once per poll interval, stamps
//! the reading with wall-clock milliseconds, records it in the
//! [`Monitor`], and notifies a [`MonitorCallback`]. It honours the
//! operator controls in [`MonitorControl`]:
//!
//! - **Pause/resume**: the loop sleeps while paused
//! - **Variable interval**: the poll interval is re-read every iteration
//! - **Stop**: wakes the loop immediately and ends it cleanly
//! - **Bounded runs**: stop after `max_polls`
//!
//! The loop is the monitor's only writer. A failed reading produces no
//! sample; it is logged, reported to the callback, and retried on the
//! next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use loadwatch_types::{Sample, StatusEvent};
use tracing::{debug, info, warn};

use crate::control::{MonitorControl, MonitorEndReason};
use crate::monitor::{Monitor, MonitorUpdate};
use crate::source::{LoadSource, SourceError};

/// Result of a finished poll loop.
#[derive(Debug)]
pub struct MonitorResult {
    /// Why the loop ended.
    pub end_reason: MonitorEndReason,
    /// Polls executed by this run, successful or not.
    pub total_polls: u64,
    /// Polls of this run whose reading failed.
    pub failed_polls: u64,
    /// Every event emitted during the run.
    pub events: Vec<StatusEvent>,
}

/// Callback invoked after each poll.
///
/// Implementations publish monitor state to readers (the observer
/// snapshot, `WebSocket` clients, ...).
pub trait MonitorCallback: Send {
    /// Called after a sample has been recorded.
    fn on_sample(&mut self, update: &MonitorUpdate, monitor: &Monitor);

    /// Called when the source failed to produce a reading.
    fn on_source_error(&mut self, _error: &SourceError) {}
}

/// A no-op callback for tests.
pub struct NoOpCallback;

impl MonitorCallback for NoOpCallback {
    fn on_sample(&mut self, _update: &MonitorUpdate, _monitor: &Monitor) {}
}

/// Current wall-clock time in epoch milliseconds.
pub fn wall_clock_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Run the poll loop with the wall clock until it is stopped.
pub async fn run_monitor(
    monitor: &mut Monitor,
    source: &mut dyn LoadSource,
    control: &Arc<MonitorControl>,
    callback: &mut dyn MonitorCallback,
) -> MonitorResult {
    let mut clock = wall_clock_ms;
    run_monitor_with_clock(monitor, source, control, callback, &mut clock).await
}

/// Run the poll loop, stamping samples with `clock`.
///
/// Tests pass a synthetic clock so windows can be exercised without
/// waiting in real time.
pub async fn run_monitor_with_clock(
    monitor: &mut Monitor,
    source: &mut dyn LoadSource,
    control: &Arc<MonitorControl>,
    callback: &mut dyn MonitorCallback,
    clock: &mut (dyn FnMut() -> i64 + Send),
) -> MonitorResult {
    let events_before = monitor.events().len();
    let mut total_polls: u64 = 0;
    let mut failed_polls: u64 = 0;

    info!(
        poll_interval_ms = control.poll_interval_ms(),
        max_polls = control.max_polls(),
        status_window_ms = monitor.settings().status_window_ms,
        retention_ms = monitor.settings().retention_ms,
        "Monitor starting"
    );

    let end_reason = loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Monitor paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Monitor resumed");
        }

        // --- Check stop request ---
        if control.is_stop_requested() {
            info!("Operator stop requested");
            break MonitorEndReason::OperatorStop;
        }

        // --- Poll ---
        match source.read_load() {
            Ok(value) => {
                let update = monitor.record(Sample::new(clock(), value));
                callback.on_sample(&update, monitor);
            }
            Err(e) => {
                failed_polls = failed_polls.saturating_add(1);
                warn!(error = %e, "Failed to read load average");
                callback.on_source_error(&e);
            }
        }

        // Per-run count; the shared counter spans every run on this control.
        total_polls = total_polls.saturating_add(1);
        control.record_poll();

        // --- Check poll limit ---
        if control.poll_limit_reached(total_polls) {
            info!(
                polls = total_polls,
                max_polls = control.max_polls(),
                "Poll limit reached"
            );
            break MonitorEndReason::MaxPollsReached;
        }

        // --- Sleep for poll interval, waking early on stop ---
        let interval_ms = control.poll_interval_ms();
        if interval_ms > 0 {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                () = control.stopped() => {
                    debug!("Sleep interrupted by stop request");
                }
            }
        } else {
            tokio::task::yield_now().await;
        }
    };

    control.set_end_reason(end_reason).await;

    let events = monitor
        .events()
        .all()
        .get(events_before..)
        .map(<[StatusEvent]>::to_vec)
        .unwrap_or_default();

    MonitorResult {
        end_reason,
        total_polls,
        failed_polls,
        events,
    }
}

/// Log the end of a poll loop.
pub fn log_monitor_end(result: &MonitorResult) {
    info!(
        reason = ?result.end_reason,
        total_polls = result.total_polls,
        failed_polls = result.failed_polls,
        events = result.events.len(),
        "Monitor ended"
    );
    if let Some(last) = result.events.last() {
        info!(kind = %last.kind, timestamp = last.timestamp, "Last status event");
    } else {
        warn!("Monitor ended with no status events");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use loadwatch_types::{Classification, StatusEventKind};

    use super::*;
    use crate::monitor::MonitorSettings;
    use crate::source::StubLoadSource;

    fn monitor() -> Monitor {
        Monitor::new(MonitorSettings {
            status_window_ms: 120_000,
            retention_ms: 600_000,
        })
    }

    /// Synthetic clock advancing ten seconds per reading.
    fn ticking_clock() -> impl FnMut() -> i64 + Send {
        let mut now = 0_i64;
        move || {
            let t = now;
            now = now.saturating_add(10_000);
            t
        }
    }

    #[tokio::test]
    async fn bounded_by_max_polls() {
        let mut monitor = monitor();
        let mut source = StubLoadSource::constant(0.3);
        let control = Arc::new(MonitorControl::with_limits(0, 5));
        let mut clock = ticking_clock();

        let result =
            run_monitor_with_clock(&mut monitor, &mut source, &control, &mut NoOpCallback, &mut clock)
                .await;

        assert_eq!(result.end_reason, MonitorEndReason::MaxPollsReached);
        assert_eq!(result.total_polls, 5);
        assert_eq!(monitor.samples().len(), 5);
        assert!(result.events.is_empty());
        assert_eq!(
            control.end_reason().await,
            Some(MonitorEndReason::MaxPollsReached)
        );
    }

    #[tokio::test]
    async fn operator_stop_before_first_poll() {
        let mut monitor = monitor();
        let mut source = StubLoadSource::constant(0.3);
        let control = Arc::new(MonitorControl::with_limits(0, 0));
        control.request_stop();

        let result = run_monitor(&mut monitor, &mut source, &control, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, MonitorEndReason::OperatorStop);
        assert_eq!(result.total_polls, 0);
        assert!(monitor.samples().is_empty());
    }

    #[tokio::test]
    async fn stop_interrupts_long_sleep() {
        let control = Arc::new(MonitorControl::with_limits(3_600_000, 0));
        let handle = {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                let mut monitor = monitor();
                let mut source = StubLoadSource::constant(0.3);
                run_monitor(&mut monitor, &mut source, &control, &mut NoOpCallback).await
            })
        };
        tokio::task::yield_now().await;
        control.request_stop();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.end_reason, MonitorEndReason::OperatorStop);
    }

    #[tokio::test]
    async fn high_then_normal_load_emits_two_events() {
        // 13 high readings fill a window, then 13 normal readings clear it.
        let mut values = vec![2.5; 13];
        values.extend(vec![0.4; 13]);
        let mut source = StubLoadSource::new(values);
        let mut monitor = monitor();
        let control = Arc::new(MonitorControl::with_limits(0, 26));
        let mut clock = ticking_clock();

        let result =
            run_monitor_with_clock(&mut monitor, &mut source, &control, &mut NoOpCallback, &mut clock)
                .await;

        let kinds: Vec<StatusEventKind> = result.events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![StatusEventKind::High, StatusEventKind::Recovered]);
        assert_eq!(result.events.first().unwrap().timestamp, 120_000);
        assert_eq!(result.events.get(1).unwrap().timestamp, 250_000);
        assert_eq!(monitor.classification(), Classification::Normal);
    }

    #[tokio::test]
    async fn source_errors_are_counted_and_skipped() {
        struct Counting {
            samples: u64,
            errors: u64,
        }
        impl MonitorCallback for Counting {
            fn on_sample(&mut self, _update: &MonitorUpdate, _monitor: &Monitor) {
                self.samples = self.samples.saturating_add(1);
            }
            fn on_source_error(&mut self, _error: &SourceError) {
                self.errors = self.errors.saturating_add(1);
            }
        }

        let mut source = StubLoadSource::new(vec![0.5, 0.6]);
        let mut monitor = monitor();
        let control = Arc::new(MonitorControl::with_limits(0, 4));
        let mut cb = Counting {
            samples: 0,
            errors: 0,
        };
        let mut clock = ticking_clock();

        let result =
            run_monitor_with_clock(&mut monitor, &mut source, &control, &mut cb, &mut clock).await;

        assert_eq!(result.total_polls, 4);
        assert_eq!(result.failed_polls, 2);
        assert_eq!(cb.samples, 2);
        assert_eq!(cb.errors, 2);
        assert_eq!(monitor.samples().len(), 2);
    }

    #[tokio::test]
    async fn poll_counts_are_per_run() {
        let control = Arc::new(MonitorControl::with_limits(0, 3));
        let mut clock = ticking_clock();

        let mut source = StubLoadSource::constant(0.3);
        let first = run_monitor_with_clock(
            &mut monitor(),
            &mut source,
            &control,
            &mut NoOpCallback,
            &mut clock,
        )
        .await;

        let mut source = StubLoadSource::new(vec![0.3]);
        let second = run_monitor_with_clock(
            &mut monitor(),
            &mut source,
            &control,
            &mut NoOpCallback,
            &mut clock,
        )
        .await;

        assert_eq!(first.total_polls, 3);
        assert_eq!(first.failed_polls, 0);
        assert_eq!(second.total_polls, 3);
        assert_eq!(second.failed_polls, 2);
        assert_eq!(second.end_reason, MonitorEndReason::MaxPollsReached);
        // The shared counter keeps the lifetime total for the operator API.
        assert_eq!(control.polls(), 6);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        assert!(wall_clock_ms() > 1_577_836_800_000);
    }
}
