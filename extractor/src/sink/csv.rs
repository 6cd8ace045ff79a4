//! CSV dataset writer.

use super::{RowSink, TextQuoting};
use crate::emit::Row;
use crate::error::{PipelineError, Result};
use crate::features::format_real;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    quoting: TextQuoting,
    path: PathBuf,
}

impl CsvSink<File> {
    /// Create (truncate) `path`, creating missing parent directories.
    pub fn create(path: &Path, quoting: TextQuoting) -> Result<Self> {
        let sink_err = |source| PipelineError::Sink {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sink_err)?;
        }
        let file = File::create(path).map_err(sink_err)?;
        Ok(Self::build(file, quoting, path.to_path_buf()))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W, quoting: TextQuoting) -> Self {
        Self::build(writer, quoting, PathBuf::from("<writer>"))
    }

    fn build(writer: W, quoting: TextQuoting, path: PathBuf) -> Self {
        let style = match quoting {
            TextQuoting::NonNumeric => QuoteStyle::NonNumeric,
            _ => QuoteStyle::Necessary,
        };
        let writer = WriterBuilder::new().quote_style(style).from_writer(writer);
        Self {
            writer,
            quoting,
            path,
        }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let path = self.path;
        self.writer.into_inner().map_err(|e| PipelineError::Sink {
            path,
            source: e.into_error(),
        })
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, columns: &[&str]) -> Result<()> {
        self.writer.write_record(columns)?;
        Ok(())
    }

    fn write_row(&mut self, row: &Row<'_>) -> Result<()> {
        let f = row.frame;
        let mut record = Vec::with_capacity(4 + row.features.len());
        record.push(format_real(f.timestamp));
        record.push(self.quoting.decorate(&f.interface));
        record.push(self.quoting.decorate(&f.identifier));
        record.push(self.quoting.decorate(&f.payload));
        record.extend(row.features.iter().map(|v| v.to_string()));
        self.writer.write_record(&record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| PipelineError::Sink {
            path: self.path.clone(),
            source,
        })
    }
}
