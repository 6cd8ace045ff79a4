//! CAN frame records and the log-line front end: grammar parser and reader.

mod parser;
mod reader;

use serde::{Deserialize, Serialize};

pub use parser::{parse_line, parse_line_detailed, LineRejection};
pub use reader::{FrameReader, ParsedLog, RejectionCounts};

/// One accepted log line. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds, as written in the log
    pub timestamp: f64,
    pub interface: String,
    /// Grouping key (CAN ID text, not interpreted)
    pub identifier: String,
    /// Hex text after `#`, possibly empty, not validated
    pub payload: String,
}

impl Frame {
    pub fn new(
        timestamp: f64,
        interface: impl Into<String>,
        identifier: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            interface: interface.into(),
            identifier: identifier.into(),
            payload: payload.into(),
        }
    }
}
