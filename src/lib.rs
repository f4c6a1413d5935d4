pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod links;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod rows;
pub mod sniff;

// Re-export key types to make them easier to use from the binaries and tests
pub use crate::batch::{run_batch, BatchStatus, BatchSummary};
pub use crate::config::{DateValidation, OverwritePolicy, ToolConfig};
pub use crate::error::{CsvToolError, Result};
pub use crate::models::{Delimiter, FileOutcome, FileReport, RowStats, ValidatedRow};
pub use crate::pipeline::CsvNormalizer;

use log::debug;

/// Initialise `env_logger`, defaulting to `info` unless `RUST_LOG` is set.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    debug!("Logging initialized");
}
