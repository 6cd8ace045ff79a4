//! Advisory diagnostics: timing anomalies and the run summary. Reported
//! through logging and the optional JSON report, never the dataset.

mod gaps;
mod summary;

pub use gaps::{GapAnalyzer, GapLevel, GapReport};
pub use summary::RunSummary;
