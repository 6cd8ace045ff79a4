//! Feature engine: timeline → the selected computations → lookup tables.

use super::{
    FeatureComputation, FeatureKind, FeatureLookup, FeatureSet, FeatureValue, InterArrival,
    InterArrivalSeries, PayloadContent, PayloadTable, WindowOccupancy, WindowOccupancyTable,
};
use crate::config::FeaturesConfig;
use crate::timeline::{FrameKey, TimelineIndex};

pub struct FeatureEngine {
    config: FeaturesConfig,
}

/// Results of one engine run. Only the computations the feature set needed
/// are present.
#[derive(Debug, Clone, Default)]
pub struct FeatureTables {
    pub inter_arrival: Option<InterArrivalSeries>,
    pub windows: Option<WindowOccupancyTable>,
    pub payload: Option<PayloadTable>,
}

impl FeatureEngine {
    pub fn new(config: FeaturesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeaturesConfig {
        &self.config
    }

    /// Run every computation `set` depends on over the whole index.
    pub fn compute(&self, set: &FeatureSet, index: &TimelineIndex) -> FeatureTables {
        let mut tables = FeatureTables::default();
        if set.contains(FeatureKind::InterArrival) {
            let ia = InterArrival::new(self.config.inter_arrival.clone());
            tables.inter_arrival = Some(ia.compute(index));
        }
        if set.contains(FeatureKind::WindowCount) {
            let wo = WindowOccupancy::new(self.config.window_seconds);
            tables.windows = Some(wo.compute(index));
        }
        if set.needs_payload() {
            let pc = PayloadContent::new(self.config.entropy_precision);
            tables.payload = Some(pc.compute(index));
        }
        tracing::debug!(
            features = ?set.kinds(),
            frames = index.len(),
            identifiers = index.streams().len(),
            "features computed"
        );
        tables
    }
}

impl FeatureLookup for FeatureTables {
    fn get(&self, kind: FeatureKind, key: FrameKey) -> Option<FeatureValue> {
        match kind {
            FeatureKind::InterArrival => self.inter_arrival.as_ref()?.get(kind, key),
            FeatureKind::WindowCount => self.windows.as_ref()?.get(kind, key),
            FeatureKind::PayloadEntropy | FeatureKind::PayloadDecimal => {
                self.payload.as_ref()?.get(kind, key)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frame;

    fn index() -> TimelineIndex {
        TimelineIndex::build(vec![
            Frame::new(1.0, "can0", "A", "00FF"),
            Frame::new(2.0, "can0", "A", "1A"),
        ])
        .unwrap()
    }

    #[test]
    fn computes_only_selected_tables() {
        let engine = FeatureEngine::new(FeaturesConfig::default());
        let set = FeatureSet::new([FeatureKind::WindowCount]);
        let tables = engine.compute(&set, &index());
        assert!(tables.windows.is_some());
        assert!(tables.inter_arrival.is_none());
        assert!(tables.payload.is_none());
    }

    #[test]
    fn dispatches_lookups_by_kind() {
        let engine = FeatureEngine::new(FeaturesConfig::default());
        let idx = index();
        let tables = engine.compute(&FeatureSet::all(), &idx);
        let second = idx.key(1);
        assert_eq!(
            tables.get(FeatureKind::PayloadDecimal, second),
            Some(FeatureValue::Integer(26u32.into()))
        );
        assert_eq!(
            tables.get(FeatureKind::WindowCount, second),
            Some(FeatureValue::Count(2))
        );
        let ia = tables.get(FeatureKind::InterArrival, second).unwrap();
        assert_eq!(ia.as_f64(), 1.0);
    }

    #[test]
    fn missing_table_yields_none() {
        let engine = FeatureEngine::new(FeaturesConfig::default());
        let idx = index();
        let tables = engine.compute(&FeatureSet::new([FeatureKind::InterArrival]), &idx);
        assert!(tables.get(FeatureKind::PayloadEntropy, idx.key(0)).is_none());
    }
}
