//! Row sinks: where emitted rows go. Quoting of string fields is a sink
//! setting only.

mod csv;

pub use self::csv::CsvSink;

use crate::emit::Row;
use crate::error::Result;
use crate::features::FeatureValue;
use crate::frames::Frame;
use serde::{Deserialize, Serialize};

pub trait RowSink {
    fn write_header(&mut self, columns: &[&str]) -> Result<()>;
    fn write_row(&mut self, row: &Row<'_>) -> Result<()>;
    /// Flush buffered output. Called once after the last row.
    fn finish(&mut self) -> Result<()>;
}

/// How the interface, identifier and payload fields are written.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TextQuoting {
    /// Quote only when the text needs it
    #[default]
    Minimal,
    /// Quote every field that does not parse as a number
    NonNumeric,
    /// `="text"`, keeps spreadsheets from reinterpreting IDs and payloads
    ExcelFormula,
    /// Text wrapped in literal quotes, rendered `"""text"""`
    Doubled,
}

impl TextQuoting {
    pub fn decorate(&self, text: &str) -> String {
        match self {
            TextQuoting::Minimal | TextQuoting::NonNumeric => text.to_string(),
            TextQuoting::ExcelFormula => format!("=\"{}\"", text),
            TextQuoting::Doubled => format!("\"{}\"", text),
        }
    }
}

/// Collects rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub header: Vec<String>,
    pub rows: Vec<(Frame, Vec<FeatureValue>)>,
    pub finished: bool,
}

impl RowSink for MemorySink {
    fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        self.header = columns.iter().map(|c| c.to_string()).collect();
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<()> {
        self.rows.push((row.frame.clone(), row.features.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
