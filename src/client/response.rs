//! Search response types
//!
//! Only the fields the lookup consumes are modelled; everything else in the
//! index's response is ignored.

use crate::query::MatchField;
use serde::Deserialize;

/// One crawl record returned by the index
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    pub url: String,

    #[serde(default)]
    pub domain: Option<String>,

    /// Storage location of the captured page
    #[serde(rename = "pageObject")]
    pub page_object: String,

    /// ISO-8601 fetch time; may be null or missing
    #[serde(rename = "fetchTime", default)]
    pub fetch_time: Option<String>,
}

impl Hit {
    /// Returns the value of the field keys are matched against
    pub fn field(&self, field: MatchField) -> Option<&str> {
        match field {
            MatchField::Url => Some(self.url.as_str()),
            MatchField::Domain => self.domain.as_deref(),
        }
    }
}

/// A decoded search or count response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Set by count requests
    pub count: Option<u64>,
    /// Set when the index opened or extended a scroll context
    pub scroll_id: Option<String>,
    /// Hits in server order
    pub hits: Vec<Hit>,
}

impl SearchResponse {
    /// Decodes a raw response body
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        let wire: WireResponse = serde_json::from_str(body)?;
        Ok(Self {
            count: wire.count,
            scroll_id: wire.scroll_id,
            hits: wire
                .hits
                .map(|h| h.hits.into_iter().map(|hit| hit.source).collect())
                .unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    count: Option<u64>,
    #[serde(rename = "_scroll_id", default)]
    scroll_id: Option<String>,
    #[serde(default)]
    hits: Option<WireHits>,
}

#[derive(Deserialize)]
struct WireHits {
    #[serde(default)]
    hits: Vec<WireHit>,
}

#[derive(Deserialize)]
struct WireHit {
    #[serde(rename = "_source")]
    source: Hit,
}
