//! The producer-side logging facade.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::models::{LogEntry, Severity};

use super::sink::{LogSink, SinkWriteError};

/// What happened to a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// The entry was handed to the sink.
    Written,
    /// The entry was less important than the logger's threshold and dropped.
    Filtered,
}

/// Stamps, filters and forwards log messages to a sink.
///
/// The threshold can be changed at runtime (the interactive `/level`
/// command does this), so it is stored atomically rather than behind a lock.
pub struct Logger {
    sink: Box<dyn LogSink>,
    threshold: AtomicU8,
}

impl Logger {
    /// Creates a logger writing to `sink`, filtering messages less important
    /// than `threshold`.
    pub fn new(sink: Box<dyn LogSink>, threshold: Severity) -> Self {
        Self { sink, threshold: AtomicU8::new(threshold.index() as u8) }
    }

    /// Returns the current severity threshold, which doubles as the default
    /// level for messages submitted without one.
    pub fn threshold(&self) -> Severity {
        Severity::from_index(self.threshold.load(Ordering::Relaxed) as usize)
            .unwrap_or(Severity::Info)
    }

    /// Replaces the severity threshold.
    pub fn set_threshold(&self, severity: Severity) {
        self.threshold.store(severity.index() as u8, Ordering::Relaxed);
    }

    /// Stamps `message` with the current time and writes it, unless it is
    /// filtered by the threshold.
    pub async fn log(
        &self,
        severity: Severity,
        message: &str,
    ) -> Result<LogOutcome, SinkWriteError> {
        if severity > self.threshold() {
            return Ok(LogOutcome::Filtered);
        }
        let entry = LogEntry::now(severity, message);
        self.sink.write(&entry).await?;
        Ok(LogOutcome::Written)
    }

    /// Logs at the current threshold severity.
    pub async fn log_default(&self, message: &str) -> Result<LogOutcome, SinkWriteError> {
        self.log(self.threshold(), message).await
    }

    /// Flushes the underlying sink.
    pub async fn flush(&self) -> Result<(), SinkWriteError> {
        self.sink.flush().await
    }
}
