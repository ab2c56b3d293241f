//! Page ordering and exact-match filtering
//!
//! Hits are re-sorted by fetch time, newest first. A hit whose fetch time is
//! missing or unparsable is ordered as if it had been fetched at `now`. That
//! keeps the sort total but silently places such hits among the newest; it
//! is an approximation kept for output compatibility.

use crate::client::Hit;
use crate::query::MatchField;
use chrono::{DateTime, NaiveDateTime, Utc};

/// One output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    pub url: String,
    pub page_object: String,
    /// Fetch time exactly as the index returned it
    pub fetch_time: Option<String>,
}

impl From<Hit> for CrawlRecord {
    fn from(hit: Hit) -> Self {
        Self {
            url: hit.url,
            page_object: hit.page_object,
            fetch_time: hit.fetch_time,
        }
    }
}

/// Parses an ISO-8601 fetch time
///
/// Accepts RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS[.fff]` values,
/// the latter read as UTC.
pub fn parse_fetch_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Sorts hits by fetch time, newest first
///
/// The sort is stable, so hits with equal times keep server order.
pub fn sort_by_fetch_time(hits: &mut [Hit], now: DateTime<Utc>) {
    hits.sort_by_cached_key(|hit| {
        std::cmp::Reverse(
            hit.fetch_time
                .as_deref()
                .and_then(parse_fetch_time)
                .unwrap_or(now),
        )
    });
}

/// Returns true if a hit should be emitted for `key`
///
/// With exact matching on, the hit's match field must equal the key
/// byte-for-byte.
pub fn is_match(hit: &Hit, key: &str, field: MatchField, exact_match: bool) -> bool {
    !exact_match || hit.field(field) == Some(key)
}

/// Orders a page and keeps the hits that pass the exact-match filter
///
/// The returned records are in output order; their count is the number of
/// matches for this page.
pub fn process_page(
    mut hits: Vec<Hit>,
    key: &str,
    field: MatchField,
    exact_match: bool,
    now: DateTime<Utc>,
) -> Vec<CrawlRecord> {
    sort_by_fetch_time(&mut hits, now);
    hits.into_iter()
        .filter(|hit| is_match(hit, key, field, exact_match))
        .map(CrawlRecord::from)
        .collect()
}
