// src/config.rs
use crate::error::{CsvToolError, Result};
use crate::models::SourceEncoding;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What happens to a row whose datetime fails the canonical check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateValidation {
    /// Drop the row and count it invalid.
    Strict,
    /// Keep the row with its datetime as found, still counted invalid.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Overwrite in place only while the invalid ratio is within tolerance.
    Conditional,
    Always,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    // Batch input
    pub data_dir: PathBuf,

    // Output policy
    pub tolerance: f64,
    pub backup_extension: String,
    pub side_file_marker: String,
    pub overwrite_policy: OverwritePolicy,

    // Parsing heuristics
    pub date_validation: DateValidation,
    pub delimiter_sample_lines: usize,
    pub encodings: Vec<SourceEncoding>,

    // Link checker
    pub remote_base_url: Option<String>,
    pub http_timeout_secs: u64,
}

impl ToolConfig {
    /// Reads a TOML config, falling back to defaults when the file is absent.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file not found at {}, using defaults", path.display());
            return Ok(ToolConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| CsvToolError::io(path, e))?;
        let config: ToolConfig = toml::from_str(&content)
            .map_err(|e| CsvToolError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(CsvToolError::Config(format!(
                "tolerance must be between 0 and 1, got {}",
                self.tolerance
            )));
        }
        if self.delimiter_sample_lines == 0 {
            return Err(CsvToolError::Config(
                "delimiter_sample_lines must be at least 1".to_string(),
            ));
        }
        if self.encodings.is_empty() {
            return Err(CsvToolError::Config("encodings must not be empty".to_string()));
        }
        if self.backup_extension.is_empty() {
            return Err(CsvToolError::Config("backup_extension must not be empty".to_string()));
        }
        if self.side_file_marker.is_empty() {
            return Err(CsvToolError::Config("side_file_marker must not be empty".to_string()));
        }
        Ok(())
    }

    /// Full URL of a local file on the remote mirror.
    pub fn remote_url_for(&self, file_name: &str) -> Option<String> {
        self.remote_base_url.as_ref().map(|base| {
            if base.ends_with('/') {
                format!("{}{}", base, file_name)
            } else {
                format!("{}/{}", base, file_name)
            }
        })
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            tolerance: 0.10,
            backup_extension: ".bak".to_string(),
            side_file_marker: "_FIXED".to_string(),
            overwrite_policy: OverwritePolicy::Conditional,
            date_validation: DateValidation::Strict,
            delimiter_sample_lines: 50,
            encodings: vec![
                SourceEncoding::Utf16Le,
                SourceEncoding::Utf8Bom,
                SourceEncoding::Utf8,
                SourceEncoding::Latin1,
            ],
            remote_base_url: None,
            http_timeout_secs: 10,
        }
    }
}
