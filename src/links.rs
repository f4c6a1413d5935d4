// src/links.rs
use crate::batch::discover_csv_files;
use crate::config::ToolConfig;
use crate::error::{CsvToolError, Result};
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Ok,
    HttpError(u16),
    ConnectionFailed(String),
}

#[derive(Debug, Clone)]
pub struct LinkReport {
    pub file: PathBuf,
    pub url: String,
    pub status: LinkStatus,
}

impl LinkReport {
    pub fn summary_line(&self) -> String {
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match &self.status {
            LinkStatus::Ok => format!("OK     {} ({})", name, self.url),
            LinkStatus::HttpError(code) => format!("ERROR  {} -> HTTP {} ({})", name, code, self.url),
            LinkStatus::ConnectionFailed(reason) => {
                format!("FAILED {} -> connection failed: {}", name, reason)
            }
        }
    }
}

pub fn classify(status: StatusCode) -> LinkStatus {
    if status == StatusCode::OK {
        LinkStatus::Ok
    } else {
        LinkStatus::HttpError(status.as_u16())
    }
}

/// Checks that every local CSV also exists under the remote base URL.
pub struct LinkChecker {
    client: Client,
    config: ToolConfig,
}

impl LinkChecker {
    pub fn new(config: ToolConfig) -> Result<Self> {
        if config.remote_base_url.is_none() {
            return Err(CsvToolError::Config(
                "remote_base_url is required for link checking".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn check_url(&self, url: &str) -> LinkStatus {
        match self.client.head(url).send().await {
            Ok(response) => classify(response.status()),
            Err(e) => LinkStatus::ConnectionFailed(e.to_string()),
        }
    }

    pub async fn check_all(&self) -> Result<Vec<LinkReport>> {
        let files = discover_csv_files(&self.config.data_dir, &self.config.side_file_marker)?;
        info!("Checking {} CSV files against the remote mirror", files.len());

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let url = self.config.remote_url_for(&name).unwrap_or_default();
            let status = self.check_url(&url).await;
            if status != LinkStatus::Ok {
                warn!("{} is not reachable at {}: {:?}", name, url, status);
            }
            reports.push(LinkReport { file, url, status });
        }
        Ok(reports)
    }
}
