use crate::query::MatchField;
use chrono::{DateTime, Duration, Local};
use serde::Deserialize;

/// Default page size cap for a single search request
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Default final-state value a crawl record must carry
pub const DEFAULT_FINAL_STATE: &str = "crawled";

/// Default crawl-result value a crawl record must carry
pub const DEFAULT_CRAWL_RESULT: &str = "SUCCESS";

/// Main configuration structure for Crawl-History, loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Remote search index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the index; `_search`, `_count` and `_search/scroll` hang off it
    #[serde(default)]
    pub endpoint: String,

    /// How long the index keeps a scroll context alive (e.g. "10m")
    #[serde(rename = "scroll-keep-alive", default = "default_keep_alive")]
    pub scroll_keep_alive: String,

    /// Maximum hits per search request
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds; absent means wait indefinitely
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            scroll_keep_alive: default_keep_alive(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the agent token looked up in robots.txt
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

/// Crawl-delay probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound on each robots.txt fetch, in seconds
    #[serde(rename = "timeout-secs", default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Delay reported when robots.txt has none or cannot be fetched
    #[serde(rename = "default-delay", default = "default_delay")]
    pub default_delay: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
            default_delay: default_delay(),
        }
    }
}

/// How records for one key are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Ask only for the number of matching records
    Count,
    /// One capped search request
    SinglePage,
    /// Open a scroll context and follow its cursor to the end
    Scroll,
}

/// Per-run query settings
///
/// Built by the command-line layer; consumed as-is by the run loop.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Inclusive lower bound on the crawl entry time ("now" is passed through)
    pub date_from: String,
    /// Inclusive upper bound on the crawl entry time
    pub date_to: String,
    /// Emit only hits whose match field equals the input key verbatim
    pub exact_match: bool,
    pub final_state: String,
    pub crawl_result: String,
    pub match_field: MatchField,
    /// Follow scroll cursors instead of stopping at one page
    pub all_results: bool,
    /// Ask for counts only
    pub count_only: bool,
    pub page_size: u32,
}

impl QueryConfig {
    /// Builds the default settings relative to `now`: the last seven days
    pub fn with_defaults_at(now: DateTime<Local>) -> Self {
        let (date_from, date_to) = default_date_range(now);
        Self {
            date_from,
            date_to,
            exact_match: false,
            final_state: DEFAULT_FINAL_STATE.to_string(),
            crawl_result: DEFAULT_CRAWL_RESULT.to_string(),
            match_field: MatchField::Url,
            all_results: false,
            count_only: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Resolves the retrieval mode; count-only takes precedence over scrolling
    pub fn retrieval_mode(&self) -> RetrievalMode {
        if self.count_only {
            RetrievalMode::Count
        } else if self.all_results {
            RetrievalMode::Scroll
        } else {
            RetrievalMode::SinglePage
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::with_defaults_at(Local::now())
    }
}

/// Returns `(now - 7 days, now)` as naive ISO-8601 strings
pub fn default_date_range(now: DateTime<Local>) -> (String, String) {
    let format = "%Y-%m-%dT%H:%M:%S%.6f";
    let now = now.naive_local();
    let from = (now - Duration::days(7)).format(format).to_string();
    let to = now.format(format).to_string();
    (from, to)
}

fn default_keep_alive() -> String {
    "10m".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_crawler_name() -> String {
    "ias-crawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_delay() -> f64 {
    0.1
}
