//! Core data model: severities, records, entries and snapshots.

mod entry;
mod record;
mod severity;
mod snapshot;

pub use entry::LogEntry;
pub use record::Record;
pub use severity::{ParseSeverityError, Severity, SEVERITY_BUCKETS};
pub use snapshot::StatsSnapshot;
