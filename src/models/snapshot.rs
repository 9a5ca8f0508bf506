//! The point-in-time view of the rolling aggregate handed to report sinks.

use serde::Serialize;

use super::severity::SEVERITY_BUCKETS;

/// An immutable copy of the aggregator's state at one instant.
///
/// Produced by [`crate::stats::StatsCollector::snapshot`]; shares no memory
/// with the aggregator after it is returned. Average fields are `0.0` and
/// `min_len` is `0` when the corresponding count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Count of all records ever ingested.
    pub total: u64,
    /// Cumulative per-severity counts, indexed by [`crate::models::Severity::index`].
    pub by_severity: [u64; SEVERITY_BUCKETS],
    /// Smallest message length seen, or 0 if no records were ingested.
    pub min_len: u64,
    /// Largest message length seen.
    pub max_len: u64,
    /// Mean message length across all records, or 0.0 with no records.
    pub avg_len: f64,
    /// Count of records whose timestamp falls within the trailing window.
    pub window_total: u64,
    /// Windowed per-severity counts.
    pub window_by_severity: [u64; SEVERITY_BUCKETS],
    /// Mean message length within the window, or 0.0 with an empty window.
    pub window_avg_len: f64,
}
