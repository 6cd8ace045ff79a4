//! Run summary: counters and gap reports for one pipeline run.

use super::{GapLevel, GapReport};
use crate::error::{PipelineError, Result};
use crate::features::FeatureKind;
use crate::frames::RejectionCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub frames_accepted: usize,
    pub rejected: usize,
    pub rejections: RejectionCounts,
    pub identifiers: usize,
    pub rows_written: usize,
    pub features: Vec<FeatureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inter_arrival_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singleton_value: Option<f64>,
    pub gap_threshold_secs: f64,
    pub gaps: Vec<GapReport>,
}

impl RunSummary {
    pub fn anomalous(&self) -> impl Iterator<Item = &GapReport> + '_ {
        self.gaps.iter().filter(|g| g.level == GapLevel::Anomalous)
    }

    pub fn log(&self) {
        tracing::info!(
            lines = self.lines_read,
            accepted = self.frames_accepted,
            rejected = self.rejected,
            blank = self.blank_lines,
            identifiers = self.identifiers,
            rows = self.rows_written,
            policy = self.inter_arrival_policy.as_deref().unwrap_or("none"),
            anomalous = self.anomalous().count(),
            "run complete"
        );
        for (reason, count) in &self.rejections {
            tracing::info!(reason = %reason, count, "rejected lines");
        }
    }

    /// Write the summary as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let sink_err = |source| PipelineError::Sink {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sink_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| sink_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        std::fs::write(path, json).map_err(sink_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::LineRejection;

    fn summary() -> RunSummary {
        let mut rejections = RejectionCounts::new();
        rejections.insert(LineRejection::MissingHash, 2);
        RunSummary {
            generated_at: Utc::now(),
            lines_read: 5,
            blank_lines: 0,
            frames_accepted: 3,
            rejected: 2,
            rejections,
            identifiers: 2,
            rows_written: 3,
            features: vec![FeatureKind::InterArrival],
            inter_arrival_policy: Some("synthesized_mean".into()),
            singleton_value: Some(0.0001),
            gap_threshold_secs: 5.0,
            gaps: vec![
                GapReport {
                    identifier: "100".into(),
                    frames: 2,
                    max_gap: 7.0,
                    large_gaps: 1,
                    level: GapLevel::Anomalous,
                },
                GapReport {
                    identifier: "200".into(),
                    frames: 1,
                    max_gap: 0.0001,
                    large_gaps: 0,
                    level: GapLevel::Normal,
                },
            ],
        }
    }

    #[test]
    fn anomalous_filter() {
        let s = summary();
        let ids: Vec<_> = s.anomalous().map(|g| g.identifier.as_str()).collect();
        assert_eq!(ids, ["100"]);
    }

    #[test]
    fn writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        summary().write_json(&path).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["frames_accepted"], 3);
        assert_eq!(v["rejections"]["missing_hash"], 2);
        assert_eq!(v["gaps"][0]["level"], "anomalous");
        assert_eq!(v["features"][0], "inter_arrival");
    }
}
