//! Parsing of interactive producer input lines.
//!
//! Interactive lines may carry an optional leading level in one of three
//! forms: `[LEVEL] message`, `LEVEL: message`, or `LEVEL message`. Lines
//! without a recognizable level are logged whole at the supplied default.
//! The token set here is more forgiving than both the wire protocol and the
//! lenient CLI parser; `INFORMATION` and `ERR` are accepted.

use crate::models::Severity;

/// Splits an interactive line into a severity and the message text.
pub fn parse_leveled_line(line: &str, default: Severity) -> (Severity, String) {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return (default, String::new());
    }

    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            if let Some(severity) = leveled_token(&rest[..end]) {
                return (severity, rest[end + 1..].trim_start().to_string());
            }
        }
        // Unrecognized or unterminated bracket form: the line is a message.
        return (default, trimmed.to_string());
    }

    let token_end = trimmed
        .find(|c: char| c.is_whitespace() || c == ':')
        .unwrap_or(trimmed.len());
    if let Some(severity) = leveled_token(&trimmed[..token_end]) {
        let mut rest = &trimmed[token_end..];
        if let Some(stripped) = rest.strip_prefix(':') {
            rest = stripped;
        }
        return (severity, rest.trim_start().to_string());
    }

    (default, trimmed.to_string())
}

fn leveled_token(token: &str) -> Option<Severity> {
    match token.to_ascii_uppercase().as_str() {
        "INFO" | "INFORMATION" => Some(Severity::Info),
        "WARN" | "WARNING" => Some(Severity::Warning),
        "ERR" | "ERROR" => Some(Severity::Error),
        _ => None,
    }
}
