//! Web-Rollup: crawl documentation sites into Markdown bundles
//!
//! This crate crawls a configured set of websites under a shared rate limit,
//! extracts a designated content region from every fetched page, converts it to
//! Markdown and writes the results as a single document or as one file per page
//! group.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Web-Rollup operations
#[derive(Debug, Error)]
pub enum RollupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetcher error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Output error: {0}")]
    Write(#[from] output::WriteError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("No content was extracted ({attempted} URLs attempted)")]
    NoContent { attempted: usize },
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

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Web-Rollup operations
pub type Result<T> = std::result::Result<T, RollupError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, OutputType, PathOverride, SiteSpec};
pub use crawler::{run, Coordinator, Fetcher, HttpFetcher, RunReport};
pub use output::{ExtractionResult, FailureKind, OutputBundle};
pub use state::TaskState;
