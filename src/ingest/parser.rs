//! Wire-format parsing for ingested lines.
//!
//! The protocol is `EPOCH_MS|LEVEL|MESSAGE`, newline-delimited. Parsing has
//! no side effects: a line either yields a [`Record`] or an error the caller
//! is expected to drop.

use thiserror::Error;

use crate::models::{Record, Severity};

/// Why a wire line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseLineError {
    /// The line did not contain the two required `|` separators.
    #[error("missing field separator")]
    MissingSeparator,
    /// The epoch field was empty, non-numeric, or did not fit in 64 bits.
    #[error("invalid epoch timestamp")]
    InvalidTimestamp,
    /// The level field was not one of the canonical tokens.
    #[error("unknown severity token")]
    UnknownSeverity,
}

/// Parses one line (without its trailing newline) into a [`Record`].
///
/// The epoch field must be all ASCII digits and non-empty. The severity
/// token must be `INFO`, `WARN` or `ERROR`, compared case-insensitively;
/// unlike the lenient [`Severity`] string parsing used on producer inputs,
/// no abbreviations are admitted here. The message may be empty and may
/// contain further `|` bytes; a single trailing carriage return is stripped
/// before its length is taken.
pub fn parse_line(line: &[u8]) -> Result<Record, ParseLineError> {
    let mut fields = line.splitn(3, |&b| b == b'|');
    let epoch_field = fields.next().ok_or(ParseLineError::MissingSeparator)?;
    let level_field = fields.next().ok_or(ParseLineError::MissingSeparator)?;
    let message = fields.next().ok_or(ParseLineError::MissingSeparator)?;

    let timestamp_ms = parse_epoch_ms(epoch_field)?;
    let severity = parse_severity_token(level_field)?;
    let message = message.strip_suffix(b"\r").unwrap_or(message);

    Ok(Record { timestamp_ms, severity, message_len: message.len() as u64 })
}

fn parse_epoch_ms(field: &[u8]) -> Result<u64, ParseLineError> {
    if field.is_empty() {
        return Err(ParseLineError::InvalidTimestamp);
    }
    let mut value: u64 = 0;
    for &byte in field {
        if !byte.is_ascii_digit() {
            return Err(ParseLineError::InvalidTimestamp);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or(ParseLineError::InvalidTimestamp)?;
    }
    Ok(value)
}

fn parse_severity_token(token: &[u8]) -> Result<Severity, ParseLineError> {
    if token.eq_ignore_ascii_case(b"INFO") {
        Ok(Severity::Info)
    } else if token.eq_ignore_ascii_case(b"WARN") {
        Ok(Severity::Warning)
    } else if token.eq_ignore_ascii_case(b"ERROR") {
        Ok(Severity::Error)
    } else {
        Err(ParseLineError::UnknownSeverity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_line() {
        let record = parse_line(b"1700000000000|info|hello").unwrap();
        assert_eq!(record.timestamp_ms, 1_700_000_000_000);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.message_len, 5);
    }

    #[test]
    fn severity_tokens_are_case_insensitive() {
        assert_eq!(parse_line(b"1|WARN|x").unwrap().severity, Severity::Warning);
        assert_eq!(parse_line(b"1|Error|x").unwrap().severity, Severity::Error);
    }

    #[test]
    fn rejects_non_numeric_epoch() {
        assert_eq!(parse_line(b"abc|INFO|x"), Err(ParseLineError::InvalidTimestamp));
        assert_eq!(parse_line(b"12a4|INFO|x"), Err(ParseLineError::InvalidTimestamp));
        assert_eq!(parse_line(b"-5|INFO|x"), Err(ParseLineError::InvalidTimestamp));
    }

    #[test]
    fn rejects_empty_epoch() {
        assert_eq!(parse_line(b"|INFO|x"), Err(ParseLineError::InvalidTimestamp));
    }

    #[test]
    fn rejects_epoch_overflowing_u64() {
        assert_eq!(
            parse_line(b"99999999999999999999999|INFO|x"),
            Err(ParseLineError::InvalidTimestamp)
        );
    }

    #[test]
    fn rejects_non_canonical_severity_tokens() {
        assert_eq!(parse_line(b"1700000000000|DEBUG|x"), Err(ParseLineError::UnknownSeverity));
        // Abbreviations are only accepted by the lenient producer-side parser.
        assert_eq!(parse_line(b"1|ERR|x"), Err(ParseLineError::UnknownSeverity));
        assert_eq!(parse_line(b"1|warning|x"), Err(ParseLineError::UnknownSeverity));
        assert_eq!(parse_line(b"1||x"), Err(ParseLineError::UnknownSeverity));
    }

    #[test]
    fn rejects_missing_separators() {
        assert_eq!(parse_line(b"1700000000000|INFO"), Err(ParseLineError::MissingSeparator));
        assert_eq!(parse_line(b"1700000000000"), Err(ParseLineError::MissingSeparator));
        assert_eq!(parse_line(b""), Err(ParseLineError::MissingSeparator));
    }

    #[test]
    fn message_may_be_empty_or_contain_separators() {
        assert_eq!(parse_line(b"1|INFO|").unwrap().message_len, 0);
        assert_eq!(parse_line(b"1|INFO|a|b|c").unwrap().message_len, 5);
    }

    #[test]
    fn trailing_carriage_return_is_stripped() {
        assert_eq!(parse_line(b"1|INFO|hello\r").unwrap().message_len, 5);
        // Only one is stripped; anything further counts as message bytes.
        assert_eq!(parse_line(b"1|INFO|hello\r\r").unwrap().message_len, 6);
    }
}
