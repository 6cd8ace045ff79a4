//! Reads a log line by line, keeping accepted frames in arrival order and
//! counting what was dropped.

use super::parser::{parse_line_detailed, LineRejection};
use super::Frame;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Rejected-line counters keyed by reason. Blank lines are tracked apart.
pub type RejectionCounts = BTreeMap<LineRejection, usize>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedLog {
    pub frames: Vec<Frame>,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub rejections: RejectionCounts,
}

impl ParsedLog {
    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    fn record(&mut self, line_no: usize, line: &str) {
        self.lines_read += 1;
        match parse_line_detailed(line) {
            Ok(frame) => self.frames.push(frame),
            Err(LineRejection::Blank) => self.blank_lines += 1,
            Err(reason) => {
                tracing::trace!(line = line_no, reason = %reason, "line rejected");
                *self.rejections.entry(reason).or_insert(0) += 1;
            }
        }
    }
}

pub struct FrameReader {
    path: PathBuf,
    inner: BufReader<File>,
}

impl FrameReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PipelineError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: BufReader::new(file),
        })
    }

    pub fn read_all(self) -> Result<ParsedLog> {
        Self::read_from(self.inner, &self.path)
    }

    /// Parse every line of `reader`. `origin` only labels I/O errors.
    pub fn read_from(reader: impl BufRead, origin: &Path) -> Result<ParsedLog> {
        let mut log = ParsedLog::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| PipelineError::Source {
                path: origin.to_path_buf(),
                source,
            })?;
            log.record(i + 1, &line);
        }
        tracing::debug!(
            lines = log.lines_read,
            accepted = log.frames.len(),
            rejected = log.rejected(),
            blank = log.blank_lines,
            "log read"
        );
        Ok(log)
    }

    /// Parse in-memory lines (tests, benches, callers that own their input).
    pub fn read_lines<'a, I>(lines: I) -> ParsedLog
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut log = ParsedLog::default();
        for (i, line) in lines.into_iter().enumerate() {
            log.record(i + 1, line);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn counts_accepted_blank_and_rejected() {
        let input = "(1.0) can0 100#00\n\nnoise\n(2.0) can0 100\n(x) can0 1#\n(3.0) can0 200#FF\n";
        let log = FrameReader::read_from(Cursor::new(input), Path::new("mem")).unwrap();
        assert_eq!(log.lines_read, 6);
        assert_eq!(log.blank_lines, 1);
        assert_eq!(log.frames.len(), 2);
        assert_eq!(log.rejected(), 3);
        assert_eq!(log.rejections[&LineRejection::MissingOpenParen], 1);
        assert_eq!(log.rejections[&LineRejection::MissingHash], 1);
        assert_eq!(log.rejections[&LineRejection::BadTimestamp], 1);
    }

    #[test]
    fn keeps_arrival_order() {
        let log = FrameReader::read_lines([
            "(3.0) can0 B#01",
            "(1.0) can0 A#02",
            "(2.0) can1 B#03",
        ]);
        let ids: Vec<_> = log.frames.iter().map(|f| f.payload.as_str()).collect();
        assert_eq!(ids, ["01", "02", "03"]);
    }

    #[test]
    fn missing_file_is_source_error() {
        let err = FrameReader::open(Path::new("/definitely/not/here.log"))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Source { .. }));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.log");
        std::fs::write(&path, "(0.5) can0 7E8#0102\n(0.6) can0 7E8#0304\n").unwrap();
        let log = FrameReader::open(&path).unwrap().read_all().unwrap();
        assert_eq!(log.frames.len(), 2);
        assert_eq!(log.rejected(), 0);
    }
}
