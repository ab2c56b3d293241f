//! Crawl-History: crawl-record lookup against a search index
//!
//! This crate looks up crawl-history records for a list of URLs or domains,
//! following scroll cursors past the index's single-request result cap, and
//! ships the small flat-file tools that sit around that lookup.

pub mod client;
pub mod config;
pub mod merge;
pub mod output;
pub mod pagination;
pub mod query;
pub mod robots;
pub mod runner;

use thiserror::Error;

/// Main error type for Crawl-History operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search request to {endpoint} failed with status {status}: {body}")]
    Transport {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Count response from {endpoint} has no count")]
    MissingCount { endpoint: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Merge error: {0}")]
    Merge(String),
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

/// Result type alias for Crawl-History operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{SearchClient, SearchEndpoint};
pub use config::{Config, QueryConfig};
pub use query::{build_request, MatchField, SearchRequest};
pub use runner::{RunState, Runner};
