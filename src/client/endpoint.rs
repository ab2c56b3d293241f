use crate::config::validate_endpoint;
use crate::ConfigError;

/// The operations the search index exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Plain capped search
    Search,
    /// Search that also opens a scroll context
    ScrollOpen,
    /// Follow an open scroll cursor
    ScrollContinue,
    /// Count matching documents
    Count,
}

/// Base URL of a search index plus the scroll keep-alive it is queried with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    base: String,
    scroll_keep_alive: String,
}

impl SearchEndpoint {
    /// Creates an endpoint from a validated base URL
    ///
    /// A trailing slash on `base` is ignored.
    pub fn new(base: &str, scroll_keep_alive: &str) -> Result<Self, ConfigError> {
        validate_endpoint(base)?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            scroll_keep_alive: scroll_keep_alive.to_string(),
        })
    }

    /// Returns the base URL without a trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the full URL for an operation
    pub fn url(&self, kind: EndpointKind) -> String {
        match kind {
            EndpointKind::Search => format!("{}/_search", self.base),
            EndpointKind::ScrollOpen => {
                format!("{}/_search?scroll={}", self.base, self.scroll_keep_alive)
            }
            EndpointKind::ScrollContinue => format!("{}/_search/scroll", self.base),
            EndpointKind::Count => format!("{}/_count", self.base),
        }
    }
}
