//! Log output: JSON lines or human-readable text, always on stderr so the
//! dataset stream stays clean.

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub struct StructuredLogger;

impl StructuredLogger {
    /// Route rejection counts, gap warnings and the run summary to stderr so
    /// the CSV dataset and the `--summary-json` line on stdout carry nothing
    /// else. `config.level` applies unless `RUST_LOG` is set; `config.json`
    /// switches to one JSON object per event for log shippers.
    ///
    /// Tests and embedding callers may call this repeatedly; only the first
    /// call installs a subscriber.
    pub fn init(config: &LogConfig) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
        let result = if config.json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if result.is_err() {
            tracing::debug!("logger already installed");
        }
    }

    /// Write `event` as one JSON line, bypassing tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
