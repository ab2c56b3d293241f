//! Query builder module
//!
//! Turns one input key plus the run's query settings into the search request
//! body sent to the index.

mod builder;
mod types;

pub use builder::{
    build_request, request_for_key, CRAWL_RESULT_FIELD, DATE_FORMAT, ENTRY_TIME_FIELD,
    FINAL_STATE_FIELD,
};
pub use types::{BoolFilter, Clause, DateRange, MatchField, MatchValue, Query, SearchRequest};
