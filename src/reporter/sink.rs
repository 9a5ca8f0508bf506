//! Output boundary for periodic reports.

use thiserror::Error;

use crate::models::StatsSnapshot;

/// Errors surfaced by a report sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink could not write the rendered report.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A destination for snapshots emitted by the reporter.
///
/// The reporter only guarantees the snapshot's field semantics; rendering is
/// entirely up to the sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Publishes one snapshot.
    async fn publish(&self, snapshot: &StatsSnapshot) -> Result<(), SinkError>;
}

/// Renders reports as a short text block on standard output.
#[derive(Debug, Default)]
pub struct StdoutReportSink;

#[async_trait::async_trait]
impl ReportSink for StdoutReportSink {
    async fn publish(&self, snapshot: &StatsSnapshot) -> Result<(), SinkError> {
        println!("{}", render(snapshot));
        Ok(())
    }
}

/// Renders each report as a single JSON object on standard output, for
/// consumption by downstream tooling.
#[derive(Debug, Default)]
pub struct JsonReportSink;

#[async_trait::async_trait]
impl ReportSink for JsonReportSink {
    async fn publish(&self, snapshot: &StatsSnapshot) -> Result<(), SinkError> {
        println!("{}", serde_json::to_string(snapshot)?);
        Ok(())
    }
}

/// Formats a snapshot as the stats block printed between ingestion bursts.
pub fn render(snapshot: &StatsSnapshot) -> String {
    format!(
        "=== stats ===\n\
         total: {} (ERROR {}, WARN {}, INFO {})\n\
         len: min {}, max {}, avg {:.1}\n\
         last_hour: {} (ERROR {}, WARN {}, INFO {}), avg_len {:.1}",
        snapshot.total,
        snapshot.by_severity[0],
        snapshot.by_severity[1],
        snapshot.by_severity[2],
        snapshot.min_len,
        snapshot.max_len,
        snapshot.avg_len,
        snapshot.window_total,
        snapshot.window_by_severity[0],
        snapshot.window_by_severity[1],
        snapshot.window_by_severity[2],
        snapshot.window_avg_len,
    )
}
