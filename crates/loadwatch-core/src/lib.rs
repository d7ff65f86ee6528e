//! Windowed hysteresis event engine and poll loop for Loadwatch.
//!
//! This crate turns a time-ordered stream of normalized load-average
//! samples into a small, ordered log of "high load" and "recovered"
//! events.
//!
//! # Modules
//!
//! - [`classifier`] -- Classifies the trailing status window as normal,
//!   high, or mixed.
//! - [`machine`] -- Hysteresis state machine and the [`EventEngine`] that
//!   owns the engine state and event log.
//! - [`event_log`] -- Append-only event log.
//! - [`window`] -- Trailing retention window of samples.
//! - [`monitor`] -- Single-writer host combining the retention window and
//!   the engine.
//! - [`source`] -- [`LoadSource`] trait, `/proc/loadavg` reader, and a stub.
//! - [`control`] -- Pause / resume / stop / interval controls.
//! - [`runner`] -- The async poll loop.
//! - [`config`] -- Configuration loading from `loadwatch-config.yaml`.
//!
//! [`EventEngine`]: machine::EventEngine
//! [`LoadSource`]: source::LoadSource

pub mod classifier;
pub mod config;
pub mod control;
pub mod event_log;
pub mod machine;
pub mod monitor;
pub mod runner;
pub mod source;
pub mod window;

#[cfg(test)]
pub(crate) mod fixtures;

pub use classifier::classify;
pub use machine::{Evaluation, EventEngine, evaluate, evaluate_with};
pub use monitor::{Monitor, MonitorSettings, MonitorUpdate};
