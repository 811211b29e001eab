//! Configuration module for Web-Rollup
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use web_rollup::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rollup.toml")).unwrap();
//! println!("Output type: {}", config.output_type);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, OutputType, PathOverride, RateSettings, ScrapeSettings, SiteSpec,
    DEFAULT_BURST_LIMIT, DEFAULT_MAX_WORKERS, DEFAULT_REQUESTS_PER_SECOND,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config, DEFAULT_CONFIG_PATH};
pub use validation::{validate, validate_sites};
