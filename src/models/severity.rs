//! The ordered severity vocabulary shared by producers and the collector.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered log importance level. `Error` is the most severe and carries the
/// lowest ordinal, so `Severity::Error < Severity::Info` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Severity {
    /// A failure that needs attention.
    Error = 0,
    /// A suspicious condition that is not yet a failure.
    Warning = 1,
    /// Routine operational information.
    Info = 2,
}

/// The number of severity buckets, used to size per-severity counters.
pub const SEVERITY_BUCKETS: usize = 3;

/// The given string named no known severity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity: {0:?}")]
pub struct ParseSeverityError(String);

impl Severity {
    /// Returns the canonical wire token for this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        }
    }

    /// Returns the counter-bucket index for this severity (`Error` first).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the severity for a counter-bucket index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Severity::Error),
            1 => Some(Severity::Warning),
            2 => Some(Severity::Info),
            _ => None,
        }
    }

    /// All severities in bucket order.
    pub fn all() -> [Severity; SEVERITY_BUCKETS] {
        [Severity::Error, Severity::Warning, Severity::Info]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient parsing for human-facing inputs (CLI flags, interactive lines).
///
/// Accepts common abbreviations in any case. The ingestion wire protocol is
/// stricter and only admits the canonical tokens; see
/// [`crate::ingest::parser`].
impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("error") || s.eq_ignore_ascii_case("err") {
            Ok(Severity::Error)
        } else if s.eq_ignore_ascii_case("warn") || s.eq_ignore_ascii_case("warning") {
            Ok(Severity::Warning)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(Severity::Info)
        } else {
            Err(ParseSeverityError(s.to_string()))
        }
    }
}
