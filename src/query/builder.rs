use crate::config::{QueryConfig, RetrievalMode};
use crate::query::types::{BoolFilter, Clause, DateRange, MatchField, Query, SearchRequest};

/// Document field holding the time a URL entered the crawl dispatcher
pub const ENTRY_TIME_FIELD: &str = "dispatcherEntryTime";

/// Document field holding the crawl's final state
pub const FINAL_STATE_FIELD: &str = "finalState";

/// Document field holding the crawl result
pub const CRAWL_RESULT_FIELD: &str = "crawlResult";

/// Date format the range bounds are declared in
pub const DATE_FORMAT: &str = "strict_date_optional_time";

/// Builds the search request for one input key
///
/// The date bounds are passed through untouched so the index can resolve
/// values like `"now"`. When `count_only` is set the `size` field is left out
/// entirely, which turns the request into a count request.
///
/// # Arguments
///
/// * `key` - Trimmed, non-empty URL or domain
/// * `date_from` / `date_to` - Inclusive bounds on the entry time
/// * `final_state` / `crawl_result` - Required values of those fields
/// * `match_field` - Field the key is matched against
/// * `page_size` - Hit cap for a single request
/// * `count_only` - Omit `size` for count requests
#[allow(clippy::too_many_arguments)]
pub fn build_request(
    key: &str,
    date_from: &str,
    date_to: &str,
    final_state: &str,
    crawl_result: &str,
    match_field: MatchField,
    page_size: u32,
    count_only: bool,
) -> SearchRequest {
    let must = vec![
        Clause::date_range(
            ENTRY_TIME_FIELD,
            DateRange {
                format: DATE_FORMAT.to_string(),
                gte: date_from.to_string(),
                lte: date_to.to_string(),
            },
        ),
        Clause::match_query(FINAL_STATE_FIELD, final_state),
        Clause::match_query(CRAWL_RESULT_FIELD, crawl_result),
        Clause::match_value(match_field.as_str(), key),
    ];

    SearchRequest {
        size: if count_only { None } else { Some(page_size) },
        query: Some(Query {
            bool_filter: BoolFilter { must },
        }),
        scroll_id: None,
    }
}

/// Builds the search request for `key` from the run's query settings
pub fn request_for_key(key: &str, config: &QueryConfig) -> SearchRequest {
    build_request(
        key,
        &config.date_from,
        &config.date_to,
        &config.final_state,
        &config.crawl_result,
        config.match_field,
        config.page_size,
        config.retrieval_mode() == RetrievalMode::Count,
    )
}
