//! Configuration loading and typed config structures for Loadwatch.
//!
//! The configuration lives in `loadwatch-config.yaml` at the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure and provides a loader that reads and validates the file.
//! Every field has a default, so an empty or missing file is valid.

use std::path::Path;

use serde::Deserialize;

/// Smallest poll interval the monitor accepts, in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Loadwatch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadwatchConfig {
    /// Sampling cadence and window durations.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Observer HTTP server settings.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LoadwatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the observer
    /// address:
    /// - `LOADWATCH_HOST` overrides `observer.host`
    /// - `LOADWATCH_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.observer.apply_env_overrides();
        config.monitor.validate()?;
        Ok(config)
    }
}

/// Sampling and windowing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// Milliseconds between load-average polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Trailing duration of samples kept in memory.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,

    /// Sustained duration required before an event is emitted or cleared.
    #[serde(default = "default_status_window_ms")]
    pub status_window_ms: u64,

    /// Stop after this many polls (0 = run until stopped).
    #[serde(default)]
    pub max_polls: u64,

    /// Path of the kernel load-average file.
    #[serde(default = "default_loadavg_path")]
    pub loadavg_path: String,
}

impl MonitorConfig {
    /// Check that the durations are usable together.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a duration is zero, the poll
    /// interval is below [`MIN_POLL_INTERVAL_MS`], or the status window is
    /// longer than the retention window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!("poll_interval_ms must be at least {MIN_POLL_INTERVAL_MS}"),
            });
        }
        if self.status_window_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "status_window_ms must be at least 1".to_owned(),
            });
        }
        if self.retention_ms < self.status_window_ms {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "retention_ms ({}) must not be shorter than status_window_ms ({})",
                    self.retention_ms, self.status_window_ms
                ),
            });
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            retention_ms: default_retention_ms(),
            status_window_ms: default_status_window_ms(),
            max_polls: 0,
            loadavg_path: default_loadavg_path(),
        }
    }
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl ObserverConfig {
    /// Apply `LOADWATCH_HOST` / `LOADWATCH_PORT` overrides.
    ///
    /// An unparseable port is ignored and the configured value kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("LOADWATCH_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("LOADWATCH_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_poll_interval_ms() -> u64 {
    10_000
}

const fn default_retention_ms() -> u64 {
    600_000
}

const fn default_status_window_ms() -> u64 {
    120_000
}

fn default_loadavg_path() -> String {
    "/proc/loadavg".to_owned()
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LoadwatchConfig::default();
        assert_eq!(config.monitor.poll_interval_ms, 10_000);
        assert_eq!(config.monitor.retention_ms, 600_000);
        assert_eq!(config.monitor.status_window_ms, 120_000);
        assert_eq!(config.monitor.max_polls, 0);
        assert!(config.monitor.validate().is_ok());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
monitor:
  poll_interval_ms: 5000
  retention_ms: 300000
  status_window_ms: 60000
  max_polls: 12
  loadavg_path: "/tmp/loadavg"

observer:
  host: "127.0.0.1"

logging:
  level: "debug"
"#;

        let config = LoadwatchConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.monitor.poll_interval_ms, 5000);
        assert_eq!(config.monitor.retention_ms, 300_000);
        assert_eq!(config.monitor.status_window_ms, 60_000);
        assert_eq!(config.monitor.max_polls, 12);
        assert_eq!(config.monitor.loadavg_path, "/tmp/loadavg");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "monitor:\n  status_window_ms: 30000\n";
        let config = LoadwatchConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.monitor.status_window_ms, 30_000);
        // Everything else uses defaults
        assert_eq!(config.monitor.poll_interval_ms, 10_000);
        assert_eq!(config.monitor.retention_ms, 600_000);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(LoadwatchConfig::parse("").is_ok());
    }

    #[test]
    fn reject_status_window_longer_than_retention() {
        let yaml = "monitor:\n  retention_ms: 60000\n  status_window_ms: 120000\n";
        assert!(matches!(
            LoadwatchConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn reject_fast_polling() {
        let yaml = "monitor:\n  poll_interval_ms: 10\n";
        assert!(matches!(
            LoadwatchConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn reject_zero_status_window() {
        let config = MonitorConfig {
            status_window_ms: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("loadwatch-config.yaml");
        if path.exists() {
            let config = LoadwatchConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
