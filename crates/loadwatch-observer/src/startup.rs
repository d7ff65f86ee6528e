//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] launches the Observer HTTP + `WebSocket` server on a
//! background Tokio task so it runs concurrently with the poll loop.
//!
//! ```rust,ignore
//! use loadwatch_observer::server::ServerConfig;
//! use loadwatch_observer::startup::spawn_observer;
//! use loadwatch_observer::state::AppState;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new());
//! let handle = spawn_observer(ServerConfig::default(), state)?;
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The address is validated before spawning; bind failures surface as an
/// error log from the task. Hold the returned handle and abort it on
/// shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address is invalid.
pub fn spawn_observer(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(handle)
}
