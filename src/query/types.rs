//! Search request body types
//!
//! These serialize to the index's query DSL: a `bool` query whose `must`
//! array holds the range and match clauses.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Which document field an input key is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchField {
    Url,
    Domain,
}

impl MatchField {
    /// Returns the document field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Domain => "domain",
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search request body
///
/// A fresh request carries `size` (unless counting) and `query`. Once a
/// scroll cursor is in use the request carries only `scroll_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

impl SearchRequest {
    /// Returns true if this request continues a scroll
    pub fn is_continuation(&self) -> bool {
        self.scroll_id.is_some()
    }

    /// Turns this request into a cursor-only continuation request
    ///
    /// The initial query body and size are dropped for good.
    pub fn continue_with(&mut self, scroll_id: impl Into<String>) {
        self.size = None;
        self.query = None;
        self.scroll_id = Some(scroll_id.into());
    }
}

/// Top-level query wrapper: `{"bool": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    #[serde(rename = "bool")]
    pub bool_filter: BoolFilter,
}

/// Ordered set of required clauses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolFilter {
    pub must: Vec<Clause>,
}

/// A single required clause
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Clause {
    /// `{"range": {field: {format, gte, lte}}}`
    Range(BTreeMap<String, DateRange>),
    /// `{"match": {field: value}}`
    Match(BTreeMap<String, MatchValue>),
}

impl Clause {
    /// Builds an inclusive date-range clause on `field`
    pub fn date_range(field: &str, range: DateRange) -> Self {
        Self::Range(BTreeMap::from([(field.to_string(), range)]))
    }

    /// Builds a match clause with the `{"query": value}` object form
    pub fn match_query(field: &str, value: &str) -> Self {
        Self::Match(BTreeMap::from([(
            field.to_string(),
            MatchValue::Query {
                query: value.to_string(),
            },
        )]))
    }

    /// Builds a match clause with the bare-value form
    pub fn match_value(field: &str, value: &str) -> Self {
        Self::Match(BTreeMap::from([(
            field.to_string(),
            MatchValue::Value(value.to_string()),
        )]))
    }
}

/// Inclusive date bounds; values are passed to the index untouched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub format: String,
    pub gte: String,
    pub lte: String,
}

/// The value side of a match clause
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchValue {
    Query { query: String },
    Value(String),
}
