//! Pipeline error kinds. Line-level rejections never reach this type.

use std::path::PathBuf;
use thiserror::Error;

use crate::features::FeatureKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read log source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid frames found in log ({lines} lines read, {rejected} rejected)")]
    EmptyInput { lines: usize, rejected: usize },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {reason}")]
    InvalidConfig { reason: String },

    #[error("cannot write output {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no {feature} value for identifier {identifier} at position {ordinal}")]
    MissingFeature {
        feature: FeatureKind,
        identifier: String,
        ordinal: usize,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Process exit status for the CLI: input problems, output problems and
    /// internal invariant failures are kept apart.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Source { .. }
            | PipelineError::EmptyInput { .. }
            | PipelineError::Config { .. }
            | PipelineError::InvalidConfig { .. } => 2,
            PipelineError::Sink { .. } | PipelineError::Csv(_) => 3,
            PipelineError::MissingFeature { .. } => 70,
        }
    }

    pub fn is_output_error(&self) -> bool {
        matches!(self, PipelineError::Sink { .. } | PipelineError::Csv(_))
    }
}
