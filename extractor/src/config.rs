//! Pipeline configuration. Every policy choice that changes output values is
//! an explicit field here with a documented default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::features::{FeatureKind, MAX_PRECISION};
use crate::sink::TextQuoting;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Feature selection and feature parameters
    pub features: FeaturesConfig,
    /// Dataset and report output
    pub output: OutputConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Feature columns to emit, in column order
    pub enabled: Vec<FeatureKind>,
    /// Width of an occupancy window (seconds)
    pub window_seconds: f64,
    /// Decimals printed for payload entropy
    pub entropy_precision: usize,
    pub inter_arrival: InterArrivalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterArrivalConfig {
    pub policy: InterArrivalPolicy,
    /// Rounding (synthesized mean) or display (fixed first) decimals
    pub precision: u32,
    /// Identifiers whose largest gap exceeds this are reported as possible
    /// timing anomalies
    pub gap_threshold_secs: f64,
}

/// How slot 0 of every identifier's inter-arrival series is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InterArrivalPolicy {
    /// Slot 0 holds the mean of the identifier's own gaps; gaps are clamped
    /// at zero and rounded. Single-frame identifiers get `singleton`.
    SynthesizedMean { singleton: SingletonSentinel },
    /// Slot 0 holds `first_gap`; later slots hold unrounded gaps clamped at
    /// zero.
    FixedFirst { first_gap: f64 },
}

/// Value assigned to identifiers seen exactly once under
/// [`InterArrivalPolicy::SynthesizedMean`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SingletonSentinel {
    /// Mean of the per-identifier means of all multi-frame identifiers, or
    /// `fallback` when there are none.
    DatasetMean { fallback: f64 },
    Fixed { value: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How string fields (interface, identifier, payload) are written
    pub quoting: TextQuoting,
    /// Optional JSON run report
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

pub const DEFAULT_WINDOW_SECONDS: f64 = 10.0;
pub const DEFAULT_SINGLETON_FALLBACK: f64 = 0.0001;
pub const DEFAULT_FIRST_GAP: f64 = 0.00001;

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            enabled: FeatureKind::ALL.to_vec(),
            window_seconds: DEFAULT_WINDOW_SECONDS,
            entropy_precision: 5,
            inter_arrival: InterArrivalConfig::default(),
        }
    }
}

impl Default for InterArrivalConfig {
    fn default() -> Self {
        Self {
            policy: InterArrivalPolicy::default(),
            precision: 6,
            gap_threshold_secs: 5.0,
        }
    }
}

impl Default for InterArrivalPolicy {
    fn default() -> Self {
        InterArrivalPolicy::SynthesizedMean {
            singleton: SingletonSentinel::default(),
        }
    }
}

impl Default for SingletonSentinel {
    fn default() -> Self {
        SingletonSentinel::DatasetMean {
            fallback: DEFAULT_SINGLETON_FALLBACK,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl InterArrivalPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            InterArrivalPolicy::SynthesizedMean { .. } => "synthesized_mean",
            InterArrivalPolicy::FixedFirst { .. } => "fixed_first",
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file if present; a missing file yields the defaults,
    /// a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| PipelineError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the settings a run depends on once file, preset and flags have
    /// been merged. Precisions beyond what an `f64` carries are capped.
    pub fn validate(&mut self) -> Result<()> {
        let features = &mut self.features;
        if features.enabled.is_empty() {
            return Err(PipelineError::InvalidConfig {
                reason: "no feature columns selected".into(),
            });
        }
        let threshold = features.inter_arrival.gap_threshold_secs;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(PipelineError::InvalidConfig {
                reason: format!("gap threshold must be non-negative seconds, got {threshold}"),
            });
        }
        let precision = &mut features.inter_arrival.precision;
        if *precision > MAX_PRECISION {
            tracing::warn!(
                requested = *precision,
                cap = MAX_PRECISION,
                "inter-arrival precision capped"
            );
            *precision = MAX_PRECISION;
        }
        let cap = MAX_PRECISION as usize;
        if features.entropy_precision > cap {
            tracing::warn!(
                requested = features.entropy_precision,
                cap,
                "entropy precision capped"
            );
            features.entropy_precision = cap;
        }
        Ok(())
    }
}

/// Canned configurations matching the three dataset variants plus a
/// combined one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Inter-arrival (synthesized mean) and window count
    Dos,
    /// Payload entropy and decimal value
    Fuzzing,
    /// Inter-arrival with a fixed first gap
    Suspension,
    /// All four feature columns
    Full,
}

impl Preset {
    pub fn apply(self, config: &mut PipelineConfig) {
        let features = &mut config.features;
        match self {
            Preset::Dos => {
                features.enabled = vec![FeatureKind::InterArrival, FeatureKind::WindowCount];
                features.inter_arrival.policy = InterArrivalPolicy::default();
                features.inter_arrival.precision = 6;
                config.output.quoting = TextQuoting::ExcelFormula;
            }
            Preset::Fuzzing => {
                features.enabled = vec![FeatureKind::PayloadEntropy, FeatureKind::PayloadDecimal];
                features.entropy_precision = 5;
                config.output.quoting = TextQuoting::Doubled;
            }
            Preset::Suspension => {
                features.enabled = vec![FeatureKind::InterArrival];
                features.inter_arrival.policy = InterArrivalPolicy::FixedFirst {
                    first_gap: DEFAULT_FIRST_GAP,
                };
                features.inter_arrival.precision = 5;
                config.output.quoting = TextQuoting::Doubled;
            }
            Preset::Full => {
                features.enabled = FeatureKind::ALL.to_vec();
            }
        }
    }
}
