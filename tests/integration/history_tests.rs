//! Integration tests for the crawl-history lookup
//!
//! These tests use wiremock to stand in for the search index and drive the
//! full key -> request -> pagination -> output cycle.

use crawl_history::client::{build_http_client, SearchClient, SearchEndpoint};
use crawl_history::config::{QueryConfig, UserAgentConfig};
use crawl_history::pagination::{retrieve_key, Termination};
use crawl_history::query::MatchField;
use crawl_history::runner::{RunState, Runner};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEADER: &str = "url,page_object,fetch_time\n";

fn client_for(server: &MockServer) -> SearchClient {
    let endpoint = SearchEndpoint::new(&server.uri(), "10m").expect("valid endpoint");
    let http = build_http_client(&UserAgentConfig::default(), None).expect("client");
    SearchClient::new(http, endpoint)
}

/// Query settings with fixed dates so request bodies are predictable
fn test_config() -> QueryConfig {
    let mut config = QueryConfig::default();
    config.date_from = "2024-01-01T00:00:00".to_string();
    config.date_to = "now".to_string();
    config
}

fn source(url: &str, domain: &str, page_object: &str, fetch_time: Option<&str>) -> Value {
    json!({
        "_index": "crawls",
        "_source": {
            "url": url,
            "domain": domain,
            "pageObject": page_object,
            "fetchTime": fetch_time,
        }
    })
}

fn page(hits: Vec<Value>, scroll_id: Option<&str>) -> Value {
    let mut body = json!({"took": 1, "hits": {"hits": hits}});
    if let Some(id) = scroll_id {
        body["_scroll_id"] = json!(id);
    }
    body
}

/// Shared buffer that collects formatted log lines
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("utf-8 logs")
    }

    fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's log events into a buffer until the guard drops
fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

async fn run(client: SearchClient, config: QueryConfig, input: &str) -> (String, RunState) {
    let mut runner = Runner::new(client, config, Vec::new());
    let state = runner.run(input.as_bytes()).await.expect("run succeeds");
    let output = String::from_utf8(runner.into_output()).expect("utf-8 output");
    (output, state)
}

#[tokio::test]
async fn test_domain_match_orders_newest_first() {
    let server = MockServer::start().await;

    let expected_body = json!({
        "size": 10000,
        "query": {"bool": {"must": [
            {"range": {"dispatcherEntryTime": {
                "format": "strict_date_optional_time",
                "gte": "2024-01-01T00:00:00",
                "lte": "now"
            }}},
            {"match": {"finalState": {"query": "crawled"}}},
            {"match": {"crawlResult": {"query": "SUCCESS"}}},
            {"match": {"domain": "example.com"}}
        ]}}
    });

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                source(
                    "http://example.com/old",
                    "example.com",
                    "s3://p/1",
                    Some("2024-01-02T00:00:00Z"),
                ),
                source(
                    "http://example.com/new",
                    "example.com",
                    "s3://p/2",
                    Some("2024-01-05T00:00:00Z"),
                ),
            ],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.match_field = MatchField::Domain;

    let (output, state) = run(client_for(&server), config, "example.com\n").await;

    assert_eq!(
        output,
        format!(
            "{}http://example.com/new,s3://p/2,2024-01-05T00:00:00Z\n\
             http://example.com/old,s3://p/1,2024-01-02T00:00:00Z\n",
            HEADER
        )
    );
    assert_eq!(state.found, 2);
    assert_eq!(state.matched, 2);
}

#[tokio::test]
async fn test_exact_match_rejects_different_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x/", "a.com", "s3://p/1", Some("2024-01-02T00:00:00Z"))],
            None,
        )))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.exact_match = true;

    let (output, state) = run(client_for(&server), config, "http://a.com/x\n").await;

    assert_eq!(output, HEADER);
    assert_eq!(state.found, 1);
    assert_eq!(state.matched, 0);
}

#[tokio::test]
async fn test_count_only_prints_key_and_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_count"))
        .and(body_string_contains("\"url\":\"http://a.com/x\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.count_only = true;
    // Ignored in count mode
    config.all_results = true;

    let (output, state) = run(client_for(&server), config, "http://a.com/x\n").await;

    assert_eq!(output, format!("{}http://a.com/x,42\n", HEADER));
    assert_eq!(state.found, 0);

    let requests = server.received_requests().await.expect("recording enabled");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert!(body.get("size").is_none());
    assert!(body.get("query").is_some());
}

#[tokio::test]
async fn test_scroll_follows_cursor_until_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(query_param("scroll", "10m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                source("http://a.com/x", "a.com", "s3://p/1", Some("2024-03-01T00:00:00Z")),
                source("http://a.com/x", "a.com", "s3://p/2", Some("2024-03-05T00:00:00Z")),
            ],
            Some("c1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({"scroll_id": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x", "a.com", "s3://p/3", None)],
            Some("c2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({"scroll_id": "c2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], Some("c2"))))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.all_results = true;

    let (output, state) = run(client_for(&server), config, "http://a.com/x\n").await;

    assert_eq!(
        output,
        format!(
            "{}http://a.com/x,s3://p/2,2024-03-05T00:00:00Z\n\
             http://a.com/x,s3://p/1,2024-03-01T00:00:00Z\n\
             http://a.com/x,s3://p/3,\n",
            HEADER
        )
    );
    assert_eq!(state.found, 3);
    assert_eq!(state.matched, 3);
    assert_eq!(state.failed, 0);
}

#[tokio::test]
async fn test_retrieve_key_reports_pages_and_exhaustion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(query_param("scroll", "10m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x", "a.com", "s3://p/1", None)],
            Some("c1"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({"scroll_id": "c1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x", "a.com", "s3://p/2", None)],
            Some("c2"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .and(body_json(json!({"scroll_id": "c2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], None)))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.all_results = true;
    let client = client_for(&server);

    let mut seen = Vec::new();
    let outcome = retrieve_key(&client, "http://a.com/x", &config, |hits| {
        seen.push(hits.len());
        Ok(())
    })
    .await
    .expect("no output error");

    assert_eq!(outcome.termination, Termination::Exhausted);
    assert_eq!(outcome.pages, 2);
    assert_eq!(seen, vec![1, 1]);
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_scroll_end_logged_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(query_param("scroll", "10m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x", "a.com", "s3://p/1", None)],
            Some("c1"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], Some("c1"))))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.all_results = true;

    let (logs, _guard) = capture_logs();
    let (_, state) = run(client_for(&server), config, "http://a.com/x\n").await;

    assert_eq!(state.matched, 1);
    assert_eq!(logs.count("no more results for http://a.com/x"), 1);
    assert_eq!(logs.count("For input #1, found:1 / matched:1"), 1);
}

#[tokio::test]
async fn test_progress_logged_every_hundred_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], None)))
        .expect(150)
        .mount(&server)
        .await;

    let input: String = (0..150)
        .map(|n| format!("http://a.com/{}\n", n))
        .collect();

    let (logs, _guard) = capture_logs();
    let (_, state) = run(client_for(&server), test_config(), &input).await;

    assert_eq!(state.progress_count, 150);
    assert_eq!(logs.count("Processing 100's key"), 1);
    assert_eq!(logs.count("Processing "), 1);
    assert_eq!(logs.count("For input #"), 150);
}

#[tokio::test]
async fn test_transport_error_stops_only_current_key() {
    let server = MockServer::start().await;

    // First key: opens a scroll, then the continuation fails
    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(query_param("scroll", "10m"))
        .and(body_string_contains("\"url\":\"http://a.com/x\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://a.com/x", "a.com", "s3://p/a", Some("2024-02-01T00:00:00Z"))],
            Some("c1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search/scroll"))
        .respond_with(ResponseTemplate::new(500).set_body_string("search_context_missing"))
        .expect(1)
        .mount(&server)
        .await;

    // Second key starts from a fresh query, not the first key's cursor
    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(query_param("scroll", "10m"))
        .and(body_string_contains("\"url\":\"http://b.com/y\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://b.com/y", "b.com", "s3://p/b", Some("2024-02-02T00:00:00Z"))],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.all_results = true;

    let (output, state) = run(
        client_for(&server),
        config,
        "http://a.com/x\nhttp://b.com/y\n",
    )
    .await;

    assert_eq!(
        output,
        format!(
            "{}http://a.com/x,s3://p/a,2024-02-01T00:00:00Z\n\
             http://b.com/y,s3://p/b,2024-02-02T00:00:00Z\n",
            HEADER
        )
    );
    assert_eq!(state.progress_count, 2);
    assert_eq!(state.found, 2);
    assert_eq!(state.failed, 1);
}

#[tokio::test]
async fn test_malformed_body_is_key_scoped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(body_string_contains("\"url\":\"http://bad.com/\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(body_string_contains("\"url\":\"http://good.com/\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![source("http://good.com/", "good.com", "s3://p/g", None)],
            None,
        )))
        .mount(&server)
        .await;

    let (output, state) = run(
        client_for(&server),
        test_config(),
        "http://bad.com/\nhttp://good.com/\n",
    )
    .await;

    assert_eq!(output, format!("{}http://good.com/,s3://p/g,\n", HEADER));
    assert_eq!(state.failed, 1);
    assert_eq!(state.matched, 1);
}

#[tokio::test]
async fn test_keys_are_trimmed_and_blank_lines_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .and(body_string_contains("\"url\":\"http://a.com/x\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], None)))
        .expect(1)
        .mount(&server)
        .await;

    let (output, state) = run(
        client_for(&server),
        test_config(),
        "\n   http://a.com/x  \n\t\n",
    )
    .await;

    assert_eq!(output, HEADER);
    assert_eq!(state.progress_count, 1);
    assert_eq!(state.failed, 0);
}

#[tokio::test]
async fn test_identical_responses_give_identical_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                source("http://a.com/x", "a.com", "s3://p/1", Some("2024-01-01T00:00:00Z")),
                source("http://a.com/x", "a.com", "s3://p/2", Some("2024-01-03T00:00:00")),
                source("http://a.com/x", "a.com", "s3://p/3", Some("2024-01-02T00:00:00.500Z")),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let input = "http://a.com/x\nhttp://a.com/x\n";
    let (first, _) = run(client_for(&server), test_config(), input).await;
    let (second, _) = run(client_for(&server), test_config(), input).await;

    assert_eq!(first, second);
    assert_eq!(first.lines().filter(|l| *l == HEADER.trim_end()).count(), 1);
    assert_eq!(first.lines().count(), 7);
    assert!(first
        .lines()
        .nth(1)
        .is_some_and(|l| l.starts_with("http://a.com/x,s3://p/2,")));
}
