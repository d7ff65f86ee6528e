//! Loadwatch engine binary.
//!
//! Wires the load source, the monitor, the poll loop, and the Observer
//! API together, then polls until stopped.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `loadwatch-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the poll-loop controls
//! 4. Start the Observer API server
//! 5. Stop the loop on `Ctrl-C`
//! 6. Run the poll loop against `/proc/loadavg`
//! 7. Publish the final state and log the result

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use loadwatch_core::config::LoadwatchConfig;
use loadwatch_core::control::MonitorControl;
use loadwatch_core::monitor::{Monitor, MonitorSettings};
use loadwatch_core::runner;
use loadwatch_core::source::ProcLoadSource;
use loadwatch_observer::server::ServerConfig;
use loadwatch_observer::startup::spawn_observer;
use loadwatch_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "loadwatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the Observer
/// server cannot start.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_FILE);
    let config = load_config(config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    let default_level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    info!("loadwatch-engine starting");
    if !config_path.exists() {
        info!(path = CONFIG_FILE, "Config file not found, using defaults");
    }
    info!(
        poll_interval_ms = config.monitor.poll_interval_ms,
        retention_ms = config.monitor.retention_ms,
        status_window_ms = config.monitor.status_window_ms,
        max_polls = config.monitor.max_polls,
        loadavg_path = %config.monitor.loadavg_path,
        "Configuration loaded"
    );

    // 3. Create poll-loop controls.
    let control = Arc::new(MonitorControl::new(&config.monitor));
    let settings = MonitorSettings::from(&config.monitor);

    // 4. Start Observer API server.
    let app_state = Arc::new(AppState::with_control(settings, Arc::clone(&control)));
    let observer_handle = spawn_observer(
        ServerConfig::from(&config.observer),
        Arc::clone(&app_state),
    )
    .map_err(EngineError::from)?;
    info!(
        host = config.observer.host,
        port = config.observer.port,
        "Observer API server started"
    );

    // 5. Stop cleanly on Ctrl-C.
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping monitor");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the poll loop.
    let mut source = ProcLoadSource::new(&config.monitor.loadavg_path);
    info!(cpus = source.cpus().get(), "Load source ready");

    let mut monitor = Monitor::new(settings);
    let mut callback = ObserverCallback::new(app_state);
    let result = runner::run_monitor(&mut monitor, &mut source, &control, &mut callback).await;

    // 7. Publish the final state, then log results.
    callback.flush(&monitor).await;
    runner::log_monitor_end(&result);
    observer_handle.abort();

    info!(
        end_reason = ?result.end_reason,
        total_polls = result.total_polls,
        "loadwatch-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, or defaults when the file is absent.
fn load_config(path: &Path) -> Result<LoadwatchConfig, EngineError> {
    if path.exists() {
        Ok(LoadwatchConfig::from_file(path)?)
    } else {
        Ok(LoadwatchConfig::parse("")?)
    }
}
