//! The typed observation produced by the wire parser and consumed by the
//! rolling aggregator.

use super::severity::Severity;

/// One ingested observation.
///
/// Records are immutable once constructed. The message text itself is not
/// retained past parsing; only its byte length participates in aggregation.
/// The timestamp is producer-supplied and untrusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Milliseconds since the Unix epoch (UTC), as claimed by the producer.
    pub timestamp_ms: u64,
    /// Severity of the original log message.
    pub severity: Severity,
    /// Byte length of the original message field.
    pub message_len: u64,
}
