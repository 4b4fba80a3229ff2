//! yt-harvest: a resumable harvester for the YouTube Data API
//!
//! This crate walks the cursor-paginated search, video, comment-thread and
//! channel listings of the API, batches video IDs into detail lookups, and
//! appends the results to CSV tables. Work already present in a previous
//! output table is skipped on the next run, and quota exhaustion is handled
//! by waiting for the quota to reset.

pub mod api;
pub mod config;
pub mod harvest;
pub mod output;
pub mod records;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] api::ApiError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date '{0}', expected DD/MM/YYYY")]
    InvalidDate(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{Harvester, HarvestPlan, ResultLimit, SearchCriteria};
pub use output::{CsvTableWriter, HarvestSummary, TableWriter};
