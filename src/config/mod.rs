//! Configuration module for Crawl-History
//!
//! Two layers live here: the optional TOML file describing the search index,
//! user agent and probe settings, and the per-run [`QueryConfig`] that the
//! command-line layer fills in.
//!
//! # Example
//!
//! ```no_run
//! use crawl_history::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl-history.toml")).unwrap();
//! println!("Page size: {}", config.search.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_date_range, Config, ProbeConfig, QueryConfig, RetrievalMode, SearchConfig,
    UserAgentConfig, DEFAULT_CRAWL_RESULT, DEFAULT_FINAL_STATE, DEFAULT_PAGE_SIZE,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate_endpoint;
