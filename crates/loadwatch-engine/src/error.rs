//! Error types for the Loadwatch engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a startup failure so `main` can propagate it with
/// `?`. Failures during polling are logged and retried, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: loadwatch_core::config::ConfigError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: loadwatch_observer::startup::StartupError,
    },
}
