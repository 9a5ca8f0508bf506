use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use super::{deserialize_duration_from_ms, deserialize_duration_from_seconds};

/// Provides the default value for listen_port.
fn default_listen_port() -> u16 {
    5555
}

/// Provides the default value for reporter_tick_ms.
fn default_reporter_tick() -> Duration {
    Duration::from_millis(200)
}

/// Provides the default value for shutdown_timeout_secs.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// How the reporter renders emitted snapshots.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// The human-readable multi-line stats block.
    #[default]
    Text,
    /// One JSON object per report.
    Json,
}

/// Errors raised while loading or validating the application configuration.
///
/// All of these are fatal at startup, before any socket is opened.
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Port 0 cannot be a collector endpoint.
    #[error("listen_port must be in 1..=65535")]
    InvalidPort,

    /// With both triggers disabled the reporter would never fire.
    #[error("at least one of report_every_n_records or report_after_secs must be non-zero")]
    NoReportTrigger,

    /// The reporter cannot poll its triggers with a zero tick.
    #[error("reporter_tick_ms must be non-zero")]
    ZeroReporterTick,
}

/// Application configuration for the collector.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// TCP port to bind on the loopback address.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Emit a report after this many newly ingested records. 0 disables the
    /// count trigger.
    #[serde(default)]
    pub report_every_n_records: u64,

    /// Emit a report at least this often. 0 disables the time trigger.
    #[serde(deserialize_with = "deserialize_duration_from_seconds", default)]
    pub report_after_secs: Duration,

    /// The interval at which the reporter polls its triggers.
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_reporter_tick"
    )]
    pub reporter_tick_ms: Duration,

    /// The maximum time to wait for graceful shutdown of all tasks.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout_secs: Duration,

    /// How emitted reports are rendered.
    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            report_every_n_records: 0,
            report_after_secs: Duration::ZERO,
            reporter_tick_ms: default_reporter_tick(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            report_format: ReportFormat::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory
    /// and the `TALLY`-prefixed environment, then validating the result.
    pub fn new(config_dir: Option<&str>) -> Result<Self, AppConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?;
        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the startup invariants that cannot be expressed through serde
    /// defaults alone.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.listen_port == 0 {
            return Err(AppConfigError::InvalidPort);
        }
        if self.report_every_n_records == 0 && self.report_after_secs.is_zero() {
            return Err(AppConfigError::NoReportTrigger);
        }
        if self.reporter_tick_ms.is_zero() {
            return Err(AppConfigError::ZeroReporterTick);
        }
        Ok(())
    }
}
