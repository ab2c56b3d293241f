//! Robots.txt handling module
//!
//! This module fetches robots.txt for a list of domains and reports the crawl
//! delay each one asks of the crawler, over both HTTP and HTTPS.

mod parser;
mod probe;

pub use parser::ParsedRobots;
pub use probe::{
    fetch_robots, probe_crawl_delay, probe_domains, DelayProbe, DelaySource, Scheme,
};
