//! Millisecond-epoch clock helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current time as milliseconds since the Unix epoch (UTC).
pub fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Renders an epoch-millisecond timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Falls back to the epoch itself if the value is outside chrono's
/// representable range.
pub fn iso8601_utc(epoch_ms: u64) -> String {
    let timestamp = DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
