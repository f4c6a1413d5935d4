// src/bin/check_links.rs
use anyhow::{Context, Result};
use clap::Parser;
use log::*;
use mt5_csv_tools::links::{LinkChecker, LinkStatus};
use mt5_csv_tools::{setup_logging, ToolConfig};
use std::path::PathBuf;
use std::process::ExitCode;

// CLI Arguments
#[derive(Parser)]
#[clap(author, version, about = "Check that every local CSV is published on the remote mirror")]
struct Args {
    /// Path to configuration file
    #[clap(short, long, default_value = "config/csv_tools.toml")]
    config: PathBuf,

    /// Directory holding the CSV files (overrides the config file)
    #[clap(short, long)]
    data_dir: Option<PathBuf>,

    /// Base URL the file names are appended to
    #[clap(short, long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[clap(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = ToolConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = args.base_url {
        config.remote_base_url = Some(url);
    }
    if let Some(secs) = args.timeout_secs {
        config.http_timeout_secs = secs;
    }

    let checker = LinkChecker::new(config).context("Failed to set up link checker")?;
    let reports = checker.check_all().await.context("Link check failed")?;

    println!("Checked {} CSV files:", reports.len());
    for report in &reports {
        println!("{}", report.summary_line());
    }

    let missing = reports.iter().filter(|r| r.status != LinkStatus::Ok).count();
    if missing > 0 {
        warn!("{} of {} files are not reachable remotely", missing, reports.len());
    }
    Ok(ExitCode::SUCCESS)
}
