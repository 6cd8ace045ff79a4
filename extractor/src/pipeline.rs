//! Two-pass batch pipeline: read and index every frame, compute features,
//! then re-walk arrival order to emit rows.

use crate::config::PipelineConfig;
use crate::diagnostics::{GapAnalyzer, RunSummary};
use crate::emit::RowEmitter;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureEngine, FeatureSet};
use crate::frames::{FrameReader, ParsedLog, RejectionCounts};
use crate::sink::{CsvSink, RowSink};
use crate::timeline::TimelineIndex;
use chrono::Utc;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

pub struct FeaturePipeline {
    config: PipelineConfig,
    features: FeatureSet,
}

/// A log that passed the empty-input check, indexed and ready to emit.
struct IndexedLog {
    index: TimelineIndex,
    lines_read: usize,
    blank_lines: usize,
    rejected: usize,
    rejections: RejectionCounts,
}

impl FeaturePipeline {
    /// Validates `config` (capping precisions) and fixes the feature set.
    pub fn new(mut config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let features = FeatureSet::new(config.features.enabled.iter().copied());
        Ok(Self { config, features })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.features
    }

    /// Run over any line source and sink.
    pub fn run<R: BufRead, S: RowSink + ?Sized>(
        &self,
        reader: R,
        sink: &mut S,
    ) -> Result<RunSummary> {
        let log = FrameReader::read_from(reader, Path::new("<input>"))?;
        self.process(log, sink)
    }

    /// Read `input`, write the dataset to `output`, and the JSON report if
    /// one is configured.
    pub fn run_files(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        info!(input = %input.display(), output = %output.display(), "converting log");
        let log = FrameReader::open(input)?.read_all()?;
        // An unusable log must not truncate an existing dataset.
        let indexed = self.index(log)?;
        let mut sink = CsvSink::create(output, self.config.output.quoting)?;
        let summary = self.emit_indexed(indexed, &mut sink)?;
        if let Some(report) = &self.config.output.report_path {
            summary.write_json(report)?;
            info!(path = %report.display(), "run report written");
        }
        Ok(summary)
    }

    /// Index an already-read log and emit it.
    pub fn process<S: RowSink + ?Sized>(&self, log: ParsedLog, sink: &mut S) -> Result<RunSummary> {
        let indexed = self.index(log)?;
        self.emit_indexed(indexed, sink)
    }

    fn index(&self, log: ParsedLog) -> Result<IndexedLog> {
        let ParsedLog {
            frames,
            lines_read,
            blank_lines,
            rejections,
        } = log;
        let rejected: usize = rejections.values().sum();
        if frames.is_empty() {
            return Err(PipelineError::EmptyInput {
                lines: lines_read,
                rejected,
            });
        }
        if rejected > 0 {
            tracing::warn!(rejected, lines = lines_read, "malformed lines skipped");
        }

        Ok(IndexedLog {
            index: TimelineIndex::build(frames)?,
            lines_read,
            blank_lines,
            rejected,
            rejections,
        })
    }

    fn emit_indexed<S: RowSink + ?Sized>(
        &self,
        indexed: IndexedLog,
        sink: &mut S,
    ) -> Result<RunSummary> {
        let IndexedLog {
            index,
            lines_read,
            blank_lines,
            rejected,
            rejections,
        } = indexed;
        let engine = FeatureEngine::new(self.config.features.clone());
        let tables = engine.compute(&self.features, &index);

        let threshold = self.config.features.inter_arrival.gap_threshold_secs;
        let gaps = tables
            .inter_arrival
            .as_ref()
            .map(|series| GapAnalyzer::new(threshold).analyze(&index, series))
            .unwrap_or_default();

        let rows_written = RowEmitter::new(&index, &tables, &self.features).emit(sink)?;

        let summary = RunSummary {
            generated_at: Utc::now(),
            lines_read,
            blank_lines,
            frames_accepted: index.len(),
            rejected,
            rejections,
            identifiers: index.streams().len(),
            rows_written,
            features: self.features.kinds().to_vec(),
            inter_arrival_policy: tables
                .inter_arrival
                .as_ref()
                .map(|s| s.policy().name().to_string()),
            singleton_value: tables.inter_arrival.as_ref().map(|s| s.singleton_value()),
            gap_threshold_secs: threshold,
            gaps,
        };
        summary.log();
        Ok(summary)
    }
}
