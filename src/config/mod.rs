//! Configuration module for Radar-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and holds the per-run options chosen on the command
//! line.
//!
//! # Example
//!
//! ```no_run
//! use radar_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Listing: {}{}", config.source.base_url, config.source.listing_path);
//! ```

mod parser;
mod run;
mod types;
mod validation;

// Re-export types
pub use run::{ExistingDataPolicy, RunConfiguration};
pub use types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
