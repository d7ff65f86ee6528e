//! Observer API server for Loadwatch.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/status`) streaming a status message
//!   after every poll via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the latest load average, retained samples,
//!   window classification, and the status event log
//! - **Alert endpoints** listing and acknowledging the alert raised for
//!   each status event
//! - **Operator endpoints** to pause, resume, re-pace, and stop the poll
//!   loop
//! - **Minimal HTML dashboard** (`GET /`)
//!
//! # Architecture
//!
//! The poll loop owns the monitor and publishes a [`MonitorSnapshot`]
//! copy after every poll. Handlers only ever read that copy, so a slow
//! client never holds up sampling.
//!
//! [`MonitorSnapshot`]: state::MonitorSnapshot

pub mod alerts;
pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, MonitorSnapshot, StatusBroadcast};
