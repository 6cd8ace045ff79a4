//! Row emitter: joins each frame's base fields with its feature values, in
//! original arrival order.

use crate::error::{PipelineError, Result};
use crate::features::{FeatureLookup, FeatureSet, FeatureValue};
use crate::frames::Frame;
use crate::sink::RowSink;
use crate::timeline::TimelineIndex;

/// One output row. `features` follows the order of the run's feature set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub frame: &'a Frame,
    pub features: Vec<FeatureValue>,
}

pub const BASE_COLUMNS: [&str; 4] = ["Timestamp", "Interface", "CAN_ID", "Payload"];

pub struct RowEmitter<'a, L: FeatureLookup> {
    index: &'a TimelineIndex,
    tables: &'a L,
    set: &'a FeatureSet,
}

impl<'a, L: FeatureLookup> RowEmitter<'a, L> {
    pub fn new(index: &'a TimelineIndex, tables: &'a L, set: &'a FeatureSet) -> Self {
        Self { index, tables, set }
    }

    /// Header: base columns followed by the feature columns.
    pub fn header(&self) -> Vec<&'static str> {
        BASE_COLUMNS.iter().copied().chain(self.set.columns()).collect()
    }

    /// Rows in arrival order. A requested feature without a value for an
    /// indexed frame is an internal error.
    pub fn rows(&self) -> impl Iterator<Item = Result<Row<'a>>> + '_ {
        self.index.iter().map(move |(key, frame)| {
            let mut features = Vec::with_capacity(self.set.kinds().len());
            for &kind in self.set.kinds() {
                let value =
                    self.tables
                        .get(kind, key)
                        .ok_or_else(|| PipelineError::MissingFeature {
                            feature: kind,
                            identifier: frame.identifier.clone(),
                            ordinal: key.ordinal,
                        })?;
                features.push(value);
            }
            Ok(Row { frame, features })
        })
    }

    /// Write header and every row to `sink`; returns the row count.
    pub fn emit<S: RowSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        sink.write_header(&self.header())?;
        let mut written = 0;
        for row in self.rows() {
            sink.write_row(&row?)?;
            written += 1;
        }
        sink.finish()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeaturesConfig;
    use crate::features::{FeatureEngine, FeatureKind, FeatureTables};
    use crate::sink::MemorySink;
    use crate::timeline::FrameKey;

    fn index() -> TimelineIndex {
        TimelineIndex::build(vec![
            Frame::new(1.0, "can0", "A", "01"),
            Frame::new(1.5, "can0", "B", "02"),
            Frame::new(2.0, "can0", "A", "03"),
        ])
        .unwrap()
    }

    #[test]
    fn rows_follow_arrival_order() {
        let idx = index();
        let set = FeatureSet::new([FeatureKind::PayloadDecimal, FeatureKind::WindowCount]);
        let tables = FeatureEngine::new(FeaturesConfig::default()).compute(&set, &idx);
        let emitter = RowEmitter::new(&idx, &tables, &set);

        let rows: Vec<_> = emitter.rows().collect::<Result<_>>().unwrap();
        let payloads: Vec<_> = rows.iter().map(|r| r.frame.payload.as_str()).collect();
        assert_eq!(payloads, ["01", "02", "03"]);
        assert_eq!(
            rows[2].features,
            vec![FeatureValue::Integer(3u32.into()), FeatureValue::Count(2)]
        );
        assert_eq!(
            emitter.header(),
            vec![
                "Timestamp",
                "Interface",
                "CAN_ID",
                "Payload",
                "Payload_Decimal",
                "CAN_ID_Window_Count"
            ]
        );
    }

    #[test]
    fn missing_feature_is_fatal() {
        let idx = index();
        let set = FeatureSet::new([FeatureKind::InterArrival]);
        let empty = FeatureTables::default();
        let emitter = RowEmitter::new(&idx, &empty, &set);
        let err = emitter.rows().next().unwrap().unwrap_err();
        match err {
            PipelineError::MissingFeature {
                feature,
                identifier,
                ordinal,
            } => {
                assert_eq!(feature, FeatureKind::InterArrival);
                assert_eq!(identifier, "A");
                assert_eq!(ordinal, 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    struct ShortTable;

    impl FeatureLookup for ShortTable {
        fn get(&self, _kind: FeatureKind, key: FrameKey) -> Option<FeatureValue> {
            (key.ordinal == 0).then_some(FeatureValue::Count(1))
        }
    }

    #[test]
    fn emit_stops_at_first_gap_in_tables() {
        let idx = index();
        let set = FeatureSet::new([FeatureKind::WindowCount]);
        let emitter = RowEmitter::new(&idx, &ShortTable, &set);
        let mut sink = MemorySink::default();
        let err = emitter.emit(&mut sink).unwrap_err();
        assert!(matches!(err, PipelineError::MissingFeature { .. }));
        assert_eq!(sink.rows.len(), 2);
    }
}
