//! Line grammar: `(timestamp) interface identifier#payload`.

use super::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a line was not accepted as a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRejection {
    Blank,
    MissingOpenParen,
    MissingCloseParen,
    MissingFields,
    MissingHash,
    BadTimestamp,
}

impl LineRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineRejection::Blank => "blank",
            LineRejection::MissingOpenParen => "missing_open_paren",
            LineRejection::MissingCloseParen => "missing_close_paren",
            LineRejection::MissingFields => "missing_fields",
            LineRejection::MissingHash => "missing_hash",
            LineRejection::BadTimestamp => "bad_timestamp",
        }
    }
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse one log line, dropping the rejection reason.
pub fn parse_line(line: &str) -> Option<Frame> {
    parse_line_detailed(line).ok()
}

pub fn parse_line_detailed(line: &str) -> Result<Frame, LineRejection> {
    let line = line.trim();
    if line.is_empty() {
        return Err(LineRejection::Blank);
    }
    let rest = line
        .strip_prefix('(')
        .ok_or(LineRejection::MissingOpenParen)?;
    let (ts_text, rest) = rest
        .split_once(')')
        .ok_or(LineRejection::MissingCloseParen)?;

    let rest = rest.trim();
    let (interface, data) = rest
        .split_once(char::is_whitespace)
        .ok_or(LineRejection::MissingFields)?;
    let data = data.trim_start();
    if interface.is_empty() || data.is_empty() {
        return Err(LineRejection::MissingFields);
    }
    let (identifier, payload) = data.split_once('#').ok_or(LineRejection::MissingHash)?;

    let timestamp: f64 = ts_text
        .trim()
        .parse()
        .map_err(|_| LineRejection::BadTimestamp)?;
    if !timestamp.is_finite() {
        return Err(LineRejection::BadTimestamp);
    }

    Ok(Frame::new(timestamp, interface, identifier, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candump_line() {
        let f = parse_line("(1609459200.123456) can0 1A3#DEADBEEF").unwrap();
        assert_eq!(f.timestamp, 1609459200.123456);
        assert_eq!(f.interface, "can0");
        assert_eq!(f.identifier, "1A3");
        assert_eq!(f.payload, "DEADBEEF");
    }

    #[test]
    fn tolerates_surrounding_and_inner_whitespace() {
        let f = parse_line("  (10.5)   vcan1 \t 7DF#0201  \r\n").unwrap();
        assert_eq!(f.timestamp, 10.5);
        assert_eq!(f.interface, "vcan1");
        assert_eq!(f.identifier, "7DF");
        assert_eq!(f.payload, "0201");
    }

    #[test]
    fn empty_payload_is_accepted() {
        let f = parse_line("(1.0) can0 123#").unwrap();
        assert_eq!(f.payload, "");
    }

    #[test]
    fn splits_on_first_hash_only() {
        let f = parse_line("(1.0) can0 123##1DEAD").unwrap();
        assert_eq!(f.identifier, "123");
        assert_eq!(f.payload, "#1DEAD");
    }

    #[test]
    fn payload_content_is_not_validated() {
        let f = parse_line("(1.0) can0 123#R").unwrap();
        assert_eq!(f.payload, "R");
    }

    #[test]
    fn rejection_reasons() {
        let cases = [
            ("", LineRejection::Blank),
            ("   ", LineRejection::Blank),
            ("10.0) can0 123#00", LineRejection::MissingOpenParen),
            ("# comment line", LineRejection::MissingOpenParen),
            ("(10.0 can0 123#00", LineRejection::MissingCloseParen),
            ("(10.0) can0", LineRejection::MissingFields),
            ("(10.0)", LineRejection::MissingFields),
            ("(10.0) can0 12300", LineRejection::MissingHash),
            ("(abc) can0 123#00", LineRejection::BadTimestamp),
            ("() can0 123#00", LineRejection::BadTimestamp),
            ("(inf) can0 123#00", LineRejection::BadTimestamp),
            ("(NaN) can0 123#00", LineRejection::BadTimestamp),
        ];
        for (line, reason) in cases {
            assert_eq!(parse_line_detailed(line), Err(reason), "line {line:?}");
            assert!(parse_line(line).is_none());
        }
    }

    #[test]
    fn hash_in_interface_token_does_not_count() {
        // the interface is the first token; `#` must be in the remainder
        assert_eq!(
            parse_line_detailed("(1.0) can#0 123"),
            Err(LineRejection::MissingHash)
        );
    }
}
