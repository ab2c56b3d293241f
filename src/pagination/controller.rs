use crate::client::{Hit, SearchClient};
use crate::config::QueryConfig;
use crate::pagination::state::{KeyPagination, Step, Termination};
use crate::query::request_for_key;
use crate::HistoryError;

/// Result of retrieving one key
#[derive(Debug)]
pub struct KeyOutcome {
    /// Why retrieval stopped
    pub termination: Termination,
    /// Number of non-empty pages processed
    pub pages: usize,
    /// Count reported by the index in count-only mode
    pub count: Option<u64>,
    /// The error that aborted retrieval, if any
    pub error: Option<HistoryError>,
}

/// Retrieves every page for one key
///
/// Each non-empty page is handed to `on_page` in the order the index returned
/// the pages. Transport and decode failures are logged and end retrieval for
/// this key only; they are reported through [`KeyOutcome::error`]. Errors
/// returned by `on_page` (e.g. a closed output stream) are propagated.
///
/// # Arguments
///
/// * `client` - Search index client
/// * `key` - Trimmed input key
/// * `config` - Query settings for the run
/// * `on_page` - Called with each page of hits
pub async fn retrieve_key<F>(
    client: &SearchClient,
    key: &str,
    config: &QueryConfig,
    mut on_page: F,
) -> Result<KeyOutcome, HistoryError>
where
    F: FnMut(Vec<Hit>) -> Result<(), HistoryError>,
{
    let mut pagination = KeyPagination::new(request_for_key(key, config), config.retrieval_mode());
    let mut count = None;
    let mut error = None;

    while let Some((kind, request)) = pagination.next_call() {
        let endpoint = client.endpoint().url(kind);
        let result = client.send(kind, request).await;

        let step = match result.and_then(|response| pagination.on_response(response, &endpoint)) {
            Ok(step) => step,
            Err(e) => {
                log_key_error(key, &e);
                pagination.abort();
                error = Some(e);
                break;
            }
        };

        match step {
            Step::Page(hits) => {
                tracing::debug!("Page {} for {}: {} hits", pagination.pages(), key, hits.len());
                on_page(hits)?;
            }
            Step::Count(n) => count = Some(n),
            Step::NoMoreResults => tracing::info!("no more results for {}", key),
        }
    }

    Ok(KeyOutcome {
        termination: pagination.termination().unwrap_or(Termination::Aborted),
        pages: pagination.pages(),
        count,
        error,
    })
}

/// Writes a key-scoped failure to the diagnostic stream
fn log_key_error(key: &str, error: &HistoryError) {
    match error {
        HistoryError::Transport {
            endpoint,
            status,
            body,
        } => {
            tracing::error!("{} (key {}, {})", status, key, endpoint);
            tracing::error!("{}", body);
        }
        other => tracing::error!("Retrieval for {} stopped: {}", key, other),
    }
}
