//! Crawl-delay probe
//!
//! For each domain, robots.txt is fetched once over HTTP and once over HTTPS.
//! Every attempt is bounded by the configured timeout; a timeout, a fetch
//! failure or a missing directive all fall back to the default delay.

use crate::config::ProbeConfig;
use crate::robots::ParsedRobots;
use crate::HistoryError;
use reqwest::Client;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// URL scheme a probe is made over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a probed delay came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySource {
    /// A `Crawl-delay` directive
    Robots,
    /// No directive, or robots.txt could not be fetched
    Default,
    /// The attempt ran past the probe timeout
    Timeout,
}

/// Outcome of one probe attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayProbe {
    /// Delay in seconds
    pub delay: f64,
    pub source: DelaySource,
}

/// Fetches and parses `<scheme>://<domain>/robots.txt`
///
/// A non-2xx response is treated as an empty robots.txt.
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Parsed content, possibly empty
/// * `Err(HistoryError)` - The domain is not a valid host or the fetch failed
pub async fn fetch_robots(
    client: &Client,
    domain: &str,
    scheme: Scheme,
) -> Result<ParsedRobots, HistoryError> {
    let url = Url::parse(&format!("{}://{}/robots.txt", scheme, domain))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HistoryError::Http {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        tracing::debug!("{} returned {}", url, response.status());
        return Ok(ParsedRobots::empty());
    }

    let body = response.text().await.map_err(|source| HistoryError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(ParsedRobots::from_content(&body))
}

/// Probes the crawl delay `agent` should honour on `domain`
///
/// Never fails: every problem is downgraded to the default delay.
pub async fn probe_crawl_delay(
    client: &Client,
    domain: &str,
    scheme: Scheme,
    agent: &str,
    settings: &ProbeConfig,
) -> DelayProbe {
    let fallback = |source| DelayProbe {
        delay: settings.default_delay,
        source,
    };
    let limit = Duration::from_secs(settings.timeout_secs);

    match tokio::time::timeout(limit, fetch_robots(client, domain, scheme)).await {
        Err(_) => {
            tracing::warn!("Timeout on {} crawl delay for {}", scheme, domain);
            fallback(DelaySource::Timeout)
        }
        Ok(Err(e)) => {
            tracing::debug!("No {} robots.txt for {}: {}", scheme, domain, e);
            fallback(DelaySource::Default)
        }
        // A zero delay counts as unset
        Ok(Ok(robots)) => match robots.crawl_delay(agent) {
            Some(delay) if delay > 0.0 => DelayProbe {
                delay,
                source: DelaySource::Robots,
            },
            _ => fallback(DelaySource::Default),
        },
    }
}

/// Probes every domain listed in the first column of a CSV file
///
/// Writes `domain,http_delay,https_delay` followed by each input row extended
/// with its two delays. Domains are probed one after the other, HTTP first.
///
/// # Arguments
///
/// * `client` - HTTP client for the robots.txt fetches
/// * `input` - CSV file with the domain in the first column
/// * `output` - Destination CSV file
/// * `skip_header` - Treat the first input row as a header
/// * `agent` - Agent token looked up in robots.txt
/// * `settings` - Timeout and default delay
///
/// # Returns
///
/// The number of domains probed
pub async fn probe_domains(
    client: &Client,
    input: &Path,
    output: &Path,
    skip_header: bool,
    agent: &str,
    settings: &ProbeConfig,
) -> Result<usize, HistoryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(skip_header)
        .flexible(true)
        .from_path(input)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(domain) = record.get(0).map(str::trim).filter(|d| !d.is_empty()) else {
            continue;
        };
        let domain = domain.to_string();
        tracing::info!("Probing crawl delay for {}", domain);

        let http = probe_crawl_delay(client, &domain, Scheme::Http, agent, settings).await;
        let https = probe_crawl_delay(client, &domain, Scheme::Https, agent, settings).await;

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.push(format_delay(http.delay));
        row.push(format_delay(https.delay));
        rows.push(row);
    }

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(output)?;
    writer.write_record(["domain", "http_delay", "https_delay"])?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(rows.len())
}

/// Formats a delay with at least one decimal place ("0.1", "10.0")
fn format_delay(delay: f64) -> String {
    format!("{:?}", delay)
}
