// src/batch.rs
use crate::config::ToolConfig;
use crate::error::{CsvToolError, Result};
use crate::models::{FileOutcome, FileReport};
use crate::pipeline::CsvNormalizer;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    NoInputFiles,
    Completed,
    CompletedWithErrors,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub base_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn status(&self) -> BatchStatus {
        if self.reports.is_empty() {
            BatchStatus::NoInputFiles
        } else if self.failures() > 0 {
            BatchStatus::CompletedWithErrors
        } else {
            BatchStatus::Completed
        }
    }

    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn count_where<F: Fn(&FileOutcome) -> bool>(&self, pred: F) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Non-recursive listing of `*.csv` files in `base_dir`, sorted by name.
///
/// Side files written by an earlier run (`<stem><marker>.csv`) are skipped.
pub fn discover_csv_files(base_dir: &Path, side_file_marker: &str) -> Result<Vec<PathBuf>> {
    if !base_dir.is_dir() {
        return Err(CsvToolError::BaseDirMissing(base_dir.to_path_buf()));
    }

    let entries = fs::read_dir(base_dir).map_err(|e| CsvToolError::io(base_dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() || !has_csv_extension(&path) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            if stem.ends_with(side_file_marker) {
                return None;
            }
            Some(path)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Normalize every CSV file in the configured base directory, one at a time.
///
/// Only a missing base directory is an error; per-file failures end up in the
/// summary as `FileOutcome::Failed`.
pub fn run_batch(config: &ToolConfig) -> Result<BatchSummary> {
    let started_at = Utc::now();
    let base_dir = config.data_dir.clone();
    let files = discover_csv_files(&base_dir, &config.side_file_marker)?;

    if files.is_empty() {
        warn!("No CSV files found in {}", base_dir.display());
        return Ok(BatchSummary {
            base_dir,
            started_at,
            reports: Vec::new(),
        });
    }

    info!("Found {} CSV files in {}", files.len(), base_dir.display());
    let normalizer = CsvNormalizer::new(config.clone());
    let mut reports = Vec::with_capacity(files.len());

    for (i, path) in files.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, files.len(), path.display());
        reports.push(normalizer.process_file_logged(path));
    }

    Ok(BatchSummary {
        base_dir,
        started_at,
        reports,
    })
}
