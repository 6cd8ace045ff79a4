//! CAN Features — turns a CAN bus log into an enriched CSV training dataset.
//!
//! Modular structure:
//! - [`frames`] — Log line grammar and reader
//! - [`timeline`] — Per-identifier index with stable frame keys
//! - [`features`] — Inter-arrival, window occupancy and payload content features
//! - [`emit`] — Arrival-order row join
//! - [`sink`] — CSV and in-memory row sinks
//! - [`diagnostics`] — Timing anomaly report and run summary
//! - [`pipeline`] — End-to-end two-pass run
//! - [`logging`] — Structured logging

pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod features;
pub mod frames;
pub mod logging;
pub mod pipeline;
pub mod sink;
pub mod timeline;

pub use config::{PipelineConfig, Preset};
pub use error::{PipelineError, Result};
pub use features::{FeatureEngine, FeatureKind, FeatureSet, FeatureValue};
pub use frames::{parse_line, Frame, FrameReader};
pub use logging::StructuredLogger;
pub use pipeline::FeaturePipeline;
pub use timeline::{FrameKey, TimelineIndex};
