//! Per-identifier feature computations over the timeline index.
//!
//! Each computation implements [`FeatureComputation`] and yields a table
//! implementing [`FeatureLookup`]; [`FeatureEngine`] runs the ones a
//! [`FeatureSet`] asks for and bundles the results in [`FeatureTables`].

mod engine;
mod inter_arrival;
mod payload;
mod window;

pub use engine::{FeatureEngine, FeatureTables};
pub use inter_arrival::{round_to, InterArrival, InterArrivalSeries, MAX_PRECISION};
pub use payload::{payload_decimal, payload_entropy, PayloadContent, PayloadFeatures, PayloadTable};
pub use window::{window_index, WindowOccupancy, WindowOccupancyTable};

use crate::timeline::{FrameKey, TimelineIndex};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    InterArrival,
    WindowCount,
    PayloadEntropy,
    PayloadDecimal,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::InterArrival,
        FeatureKind::WindowCount,
        FeatureKind::PayloadEntropy,
        FeatureKind::PayloadDecimal,
    ];

    /// Output column header
    pub fn column(&self) -> &'static str {
        match self {
            FeatureKind::InterArrival => "CAN_ID_Inter_Arrival",
            FeatureKind::WindowCount => "CAN_ID_Window_Count",
            FeatureKind::PayloadEntropy => "Payload_Entropy",
            FeatureKind::PayloadDecimal => "Payload_Decimal",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::InterArrival => "inter_arrival",
            FeatureKind::WindowCount => "window_count",
            FeatureKind::PayloadEntropy => "payload_entropy",
            FeatureKind::PayloadDecimal => "payload_decimal",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free selection of feature columns for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    kinds: Vec<FeatureKind>,
}

impl FeatureSet {
    pub fn new(kinds: impl IntoIterator<Item = FeatureKind>) -> Self {
        let mut out: Vec<FeatureKind> = Vec::new();
        for k in kinds {
            if !out.contains(&k) {
                out.push(k);
            }
        }
        Self { kinds: out }
    }

    pub fn all() -> Self {
        Self::new(FeatureKind::ALL)
    }

    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.iter().map(|k| k.column())
    }

    fn needs_payload(&self) -> bool {
        self.contains(FeatureKind::PayloadEntropy) || self.contains(FeatureKind::PayloadDecimal)
    }
}

/// A single feature cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Real value; `decimals` fixes the printed precision, `None` prints the
    /// shortest exact form.
    Real { value: f64, decimals: Option<usize> },
    Count(u64),
    /// Unbounded so 64-byte CAN FD payloads keep their exact value.
    Integer(BigUint),
}

impl FeatureValue {
    /// Lossy for integers beyond 2^53; `inf` when out of `f64` range.
    pub fn as_f64(&self) -> f64 {
        match self {
            FeatureValue::Real { value, .. } => *value,
            FeatureValue::Count(c) => *c as f64,
            FeatureValue::Integer(i) => i.to_f64().unwrap_or(f64::INFINITY),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Real {
                value,
                decimals: Some(d),
            } => write!(f, "{:.*}", *d, value),
            FeatureValue::Real {
                value,
                decimals: None,
            } => f.write_str(&format_real(*value)),
            FeatureValue::Count(c) => write!(f, "{}", c),
            FeatureValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

/// Shortest round-trip form, keeping one decimal on whole numbers (`10.0`).
pub fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Read access to a computed feature table.
pub trait FeatureLookup {
    /// Value of `kind` for the frame at `key`, or `None` when this table does
    /// not hold it.
    fn get(&self, kind: FeatureKind, key: FrameKey) -> Option<FeatureValue>;
}

/// One pluggable feature computation over the whole timeline.
pub trait FeatureComputation {
    type Output: FeatureLookup;

    /// Feature columns the output can answer for.
    fn provides(&self) -> &'static [FeatureKind];

    fn compute(&self, index: &TimelineIndex) -> Self::Output;
}
