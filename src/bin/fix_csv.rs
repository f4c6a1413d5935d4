// src/bin/fix_csv.rs
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::*;
use mt5_csv_tools::{
    run_batch, setup_logging, BatchStatus, CsvToolError, DateValidation, FileOutcome,
    OverwritePolicy, ToolConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Conditional,
    Always,
    Never,
}

impl From<PolicyArg> for OverwritePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Conditional => OverwritePolicy::Conditional,
            PolicyArg::Always => OverwritePolicy::Always,
            PolicyArg::Never => OverwritePolicy::Never,
        }
    }
}

// CLI Arguments
#[derive(Parser)]
#[clap(author, version, about = "Normalize MT5 OHLCV CSV exports to UTF-8, comma-separated, ISO dates")]
struct Args {
    /// Path to configuration file
    #[clap(short, long, default_value = "config/csv_tools.toml")]
    config: PathBuf,

    /// Directory holding the CSV files (overrides the config file)
    #[clap(short, long)]
    data_dir: Option<PathBuf>,

    /// Maximum share of invalid rows that still allows an in-place overwrite
    #[clap(short, long)]
    tolerance: Option<f64>,

    /// Keep rows whose date cannot be made canonical instead of dropping them
    #[clap(long)]
    lenient_dates: bool,

    /// When to overwrite the original file
    #[clap(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Print the batch summary as JSON
    #[clap(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<ToolConfig> {
    let mut config = ToolConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if args.lenient_dates {
        config.date_validation = DateValidation::Lenient;
    }
    if let Some(policy) = args.policy {
        config.overwrite_policy = policy.into();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    let summary = match run_batch(&config) {
        Ok(summary) => summary,
        Err(CsvToolError::BaseDirMissing(dir)) => {
            error!("Base directory not found: {}", dir.display());
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).context("Batch failed"),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        for report in &summary.reports {
            println!("{}", report.summary_line());
        }
    }

    match summary.status() {
        BatchStatus::NoInputFiles => {
            println!("No CSV files in {}", summary.base_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        BatchStatus::Completed => {
            info!(
                "Done: {} normalized, {} diverted, {} skipped",
                summary.count_where(|o| matches!(o, FileOutcome::Normalized { .. })),
                summary.count_where(|o| matches!(o, FileOutcome::Diverted { .. })),
                summary.count_where(|o| {
                    matches!(o, FileOutcome::SkippedEmpty | FileOutcome::SkippedNoValidRows)
                }),
            );
            Ok(ExitCode::SUCCESS)
        }
        BatchStatus::CompletedWithErrors => {
            warn!("{} of {} files failed", summary.failures(), summary.reports.len());
            Ok(ExitCode::from(2))
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
