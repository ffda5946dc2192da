//! Radar-Harvest: a resumable stock snapshot harvester
//!
//! This crate crawls the listing of exchange-traded symbols on a financial
//! data site, follows the chain of detail pages for each symbol, extracts
//! typed financial fields and checkpoints every completed symbol so that a
//! long, rate-limited crawl can be interrupted and resumed.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for Radar-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to get the stock list: {url} returned HTTP {status}")]
    ListingStatus { url: String, status: u16 },

    #[error("Failed to get the stock list: {message}")]
    ListingParse { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Prompt error: {0}")]
    Prompt(String),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Radar-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, RunConfiguration};
pub use record::{BalanceSheet, StockRecord, Symbol};
