//! The producer-side log entry and its serialized forms.

use serde::{Deserialize, Serialize};

use super::severity::Severity;
use crate::time::{iso8601_utc, now_epoch_ms};

/// A complete log entry as emitted by a producer, before it is reduced to a
/// [`crate::models::Record`] on the collector side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch (UTC) at which the entry was created.
    pub timestamp_ms: u64,
    /// Severity of the message.
    pub severity: Severity,
    /// The message text. Must not contain a newline; the wire framing would
    /// split it into two lines.
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current system time.
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self { timestamp_ms: now_epoch_ms(), severity, message: message.into() }
    }

    /// Renders the `EPOCH_MS|LEVEL|MESSAGE\n` wire line understood by the
    /// collector's ingestion protocol.
    pub fn wire_line(&self) -> String {
        format!("{}|{}|{}\n", self.timestamp_ms, self.severity, self.message)
    }

    /// Renders the human-readable form used by file sinks:
    /// `ISO8601 LEVEL message`.
    pub fn display_line(&self) -> String {
        format!("{} {} {}", iso8601_utc(self.timestamp_ms), self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_line_has_two_separators_and_newline() {
        let entry = LogEntry {
            timestamp_ms: 1_700_000_000_000,
            severity: Severity::Warning,
            message: "low disk space".to_string(),
        };
        assert_eq!(entry.wire_line(), "1700000000000|WARN|low disk space\n");
    }

    #[test]
    fn display_line_renders_utc_timestamp() {
        let entry = LogEntry {
            timestamp_ms: 0,
            severity: Severity::Info,
            message: "boot".to_string(),
        };
        assert_eq!(entry.display_line(), "1970-01-01T00:00:00Z INFO boot");
    }
}
