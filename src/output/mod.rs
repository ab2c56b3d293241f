//! Output module for ordering, filtering and writing crawl records
//!
//! This module handles:
//! - Sorting each page of hits by fetch time, newest first
//! - The optional exact-match filter
//! - Writing the header, record and count lines to standard output

mod filter;
mod writer;

pub use filter::{is_match, parse_fetch_time, process_page, sort_by_fetch_time, CrawlRecord};
pub use writer::{RecordWriter, HEADER};
