//! Advisory gap report: flags identifiers whose largest inter-arrival gap
//! exceeds a threshold. Never affects the dataset.

use crate::features::InterArrivalSeries;
use crate::timeline::{StreamId, TimelineIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapLevel {
    Normal,
    /// Possible timing anomaly (e.g. a suspended sender)
    Anomalous,
}

impl GapLevel {
    pub fn from_max_gap(max_gap: f64, threshold: f64) -> Self {
        if max_gap > threshold {
            GapLevel::Anomalous
        } else {
            GapLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub identifier: String,
    pub frames: usize,
    pub max_gap: f64,
    /// Individual gaps above the threshold
    pub large_gaps: usize,
    pub level: GapLevel,
}

pub struct GapAnalyzer {
    threshold: f64,
}

impl GapAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// One report per identifier, in first-appearance order.
    pub fn analyze(&self, index: &TimelineIndex, series: &InterArrivalSeries) -> Vec<GapReport> {
        let mut reports = Vec::with_capacity(index.streams().len());
        let mut large_total = 0usize;
        for (i, stream) in index.streams().iter().enumerate() {
            let id = StreamId(i);
            let max_gap = series.max_gap(id);
            let large_gaps = series.gaps_above(id, self.threshold);
            large_total += large_gaps;
            let level = GapLevel::from_max_gap(max_gap, self.threshold);
            if level == GapLevel::Anomalous {
                warn!(
                    can_id = %stream.identifier,
                    max_gap,
                    large_gaps,
                    threshold = self.threshold,
                    "possible timing anomaly"
                );
            } else {
                debug!(can_id = %stream.identifier, max_gap, "max inter-arrival");
            }
            reports.push(GapReport {
                identifier: stream.identifier.clone(),
                frames: stream.positions.len(),
                max_gap,
                large_gaps,
                level,
            });
        }
        if large_total > 0 {
            warn!(
                count = large_total,
                threshold = self.threshold,
                "inter-arrival gaps above threshold"
            );
        }
        reports
    }
}
