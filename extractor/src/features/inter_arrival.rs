//! Inter-arrival time between successive frames of one identifier.

use super::{FeatureComputation, FeatureKind, FeatureLookup, FeatureValue};
use crate::config::{InterArrivalConfig, InterArrivalPolicy, SingletonSentinel};
use crate::timeline::{FrameKey, StreamId, TimelineIndex};

/// Most decimals an `f64` can carry meaningfully; larger requests are capped.
pub const MAX_PRECISION: u32 = 15;

/// Round half away from zero to `decimals` places (at most [`MAX_PRECISION`]).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals.min(MAX_PRECISION) as i32);
    (value * scale).round() / scale
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

pub struct InterArrival {
    config: InterArrivalConfig,
}

/// One series per identifier, aligned by ordinal with the identifier's frames.
#[derive(Debug, Clone)]
pub struct InterArrivalSeries {
    series: Vec<Vec<f64>>,
    policy: InterArrivalPolicy,
    decimals: Option<usize>,
    singleton_value: f64,
}

impl InterArrival {
    pub fn new(config: InterArrivalConfig) -> Self {
        Self { config }
    }

    fn synthesized(
        &self,
        index: &TimelineIndex,
        singleton: SingletonSentinel,
    ) -> (Vec<Vec<f64>>, f64) {
        let p = self.config.precision;
        let mut series = Vec::with_capacity(index.streams().len());
        let mut means = Vec::new();

        for i in 0..index.streams().len() {
            let ts = index.timestamps(StreamId(i));
            if ts.len() < 2 {
                series.push(Vec::new());
                continue;
            }
            let gaps: Vec<f64> = ts
                .windows(2)
                .map(|w| non_negative(round_to(w[1] - w[0], p)))
                .collect();
            let mean = round_to(gaps.iter().sum::<f64>() / gaps.len() as f64, p);
            means.push(mean);

            let mut s = Vec::with_capacity(ts.len());
            s.push(mean);
            s.extend(gaps);
            series.push(s);
        }

        let sentinel = match singleton {
            SingletonSentinel::DatasetMean { fallback } if means.is_empty() => fallback,
            SingletonSentinel::DatasetMean { .. } => {
                round_to(means.iter().sum::<f64>() / means.len() as f64, p)
            }
            SingletonSentinel::Fixed { value } => value,
        };
        for s in series.iter_mut().filter(|s| s.is_empty()) {
            s.push(sentinel);
        }
        (series, sentinel)
    }

    fn fixed_first(&self, index: &TimelineIndex, first_gap: f64) -> Vec<Vec<f64>> {
        (0..index.streams().len())
            .map(|i| {
                let ts = index.timestamps(StreamId(i));
                let mut s = Vec::with_capacity(ts.len());
                s.push(first_gap);
                s.extend(ts.windows(2).map(|w| non_negative(w[1] - w[0])));
                s
            })
            .collect()
    }
}

impl FeatureComputation for InterArrival {
    type Output = InterArrivalSeries;

    fn provides(&self) -> &'static [FeatureKind] {
        &[FeatureKind::InterArrival]
    }

    fn compute(&self, index: &TimelineIndex) -> InterArrivalSeries {
        let policy = self.config.policy;
        let (series, singleton_value, decimals) = match policy {
            InterArrivalPolicy::SynthesizedMean { singleton } => {
                let (series, sentinel) = self.synthesized(index, singleton);
                (series, sentinel, None)
            }
            InterArrivalPolicy::FixedFirst { first_gap } => (
                self.fixed_first(index, first_gap),
                first_gap,
                Some(self.config.precision as usize),
            ),
        };
        tracing::debug!(
            policy = policy.name(),
            identifiers = series.len(),
            singleton_value,
            "inter-arrival computed"
        );
        InterArrivalSeries {
            series,
            policy,
            decimals,
            singleton_value,
        }
    }
}

impl InterArrivalSeries {
    pub fn series(&self, stream: StreamId) -> &[f64] {
        &self.series[stream.0]
    }

    pub fn policy(&self) -> InterArrivalPolicy {
        self.policy
    }

    /// Value a single-frame identifier receives in this run.
    pub fn singleton_value(&self) -> f64 {
        self.singleton_value
    }

    /// Largest value in the identifier's series.
    pub fn max_gap(&self, stream: StreamId) -> f64 {
        self.series[stream.0]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Real gaps (slots after the first) greater than `threshold`.
    pub fn gaps_above(&self, stream: StreamId, threshold: f64) -> usize {
        self.series[stream.0]
            .iter()
            .skip(1)
            .filter(|&&g| g > threshold)
            .count()
    }
}

impl FeatureLookup for InterArrivalSeries {
    fn get(&self, kind: FeatureKind, key: FrameKey) -> Option<FeatureValue> {
        if kind != FeatureKind::InterArrival {
            return None;
        }
        let value = *self.series.get(key.stream.0)?.get(key.ordinal)?;
        Some(FeatureValue::Real {
            value,
            decimals: self.decimals,
        })
    }
}
