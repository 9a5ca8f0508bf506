//! Configuration module for the collector.

mod app_config;
mod helpers;

pub use app_config::{AppConfig, AppConfigError, ReportFormat};
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};
