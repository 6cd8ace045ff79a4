//! `can-features` entrypoint: convert one CAN log into a feature CSV.

use can_features::{
    config::PipelineConfig, logging::StructuredLogger, sink::TextQuoting, FeatureKind,
    FeaturePipeline, Preset,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "can-features")]
#[command(version, about = "Derive per-identifier timing and payload features from a CAN log")]
struct Cli {
    /// Input log (`(timestamp) interface ID#PAYLOAD` per line)
    input: PathBuf,

    /// Output CSV path
    output: PathBuf,

    /// JSON configuration file
    #[arg(short, long, env = "CAN_FEATURES_CONFIG")]
    config: Option<PathBuf>,

    /// Start from a canned feature/policy combination
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Feature columns to emit (repeatable; overrides config and preset)
    #[arg(short, long = "feature", value_enum)]
    features: Vec<FeatureKind>,

    /// Quoting of interface, identifier and payload fields
    #[arg(short, long, value_enum)]
    quoting: Option<TextQuoting>,

    /// Gap above which an identifier is reported as a timing anomaly (seconds)
    #[arg(long)]
    gap_threshold: Option<f64>,

    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the run summary as one JSON line on stdout
    #[arg(long)]
    summary_json: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(preset) = self.preset {
            preset.apply(config);
        }
        if !self.features.is_empty() {
            config.features.enabled = self.features.clone();
        }
        if let Some(q) = self.quoting {
            config.output.quoting = q;
        }
        if let Some(t) = self.gap_threshold {
            config.features.inter_arrival.gap_threshold_secs = t;
        }
        if let Some(r) = &self.report {
            config.output.report_path = Some(r.clone());
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if self.json_logs {
            config.log.json = true;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match PipelineConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(e.exit_code());
            }
        },
        None => PipelineConfig::default(),
    };
    cli.apply(&mut config);

    StructuredLogger::init(&config.log);
    info!(
        features = ?config.features.enabled,
        policy = config.features.inter_arrival.policy.name(),
        "can-features starting"
    );

    let pipeline = match FeaturePipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "invalid settings");
            return ExitCode::from(e.exit_code());
        }
    };
    match pipeline.run_files(&cli.input, &cli.output) {
        Ok(summary) => {
            if cli.summary_json {
                let mut out = std::io::stdout().lock();
                if let Err(e) = StructuredLogger::emit_json(&summary, &mut out) {
                    error!(error = %e, "cannot print summary");
                }
            }
            info!(output = %cli.output.display(), rows = summary.rows_written, "conversion complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, output_error = e.is_output_error(), "conversion failed");
            ExitCode::from(e.exit_code())
        }
    }
}
