//! Integration tests for the refresh pipeline
//!
//! These tests use wiremock to stand in for the marketplace and drive the
//! full fetch → extract → filter → cache cycle.

use async_trait::async_trait;
use pricewatch::config::{Config, SourceConfig};
use pricewatch::pipeline::{
    Extractor, FetchError, FetchRequest, Fetcher, HttpFetcher, RegionFilter, Refresher,
};
use pricewatch::{PricewatchError, SnapshotCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_CARD_PAGE: &str = r#"<html><body><div class="row">
    <div class="col-sm-6 product-card-wrapper--v2">
        <div class="product-title__text">EU Central 1</div>
        <div class="g-chip-counter">120</div>
        <span class="price-amount-x">$4.56</span>
    </div>
    <div class="col-sm-6 product-card-wrapper--v2">
        <div class="product-title__text">NA East</div>
        <div class="g-chip-counter">50</div>
        <span class="price-amount-x">$3.00</span>
    </div>
</div></body></html>"#;

const NO_MATCH_PAGE: &str = r#"<html><body>
    <div class="product-card-wrapper">
        <div class="product-title">NA West</div>
        <div class="g-chip-counter">9</div>
        <span class="price-amount">$1.00</span>
    </div>
</body></html>"#;

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, timeout_ms: u64) -> Config {
    let mut config = Config::default();
    config.source = SourceConfig {
        url: format!("{}/categories/gold", base_url),
        timeout_ms,
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) PricewatchTest/1.0".to_string(),
        accept: "text/html".to_string(),
        accept_language: "en-US".to_string(),
        referer: "https://market.example.com/".to_string(),
    };
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_end_to_end_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .respond_with(html(TWO_CARD_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5_000);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();

    let outcome = refresher.refresh().await.expect("refresh should succeed");
    assert!(outcome.is_refreshed());

    let snapshot = refresher.snapshot();
    assert!(snapshot.is_captured());
    assert_eq!(snapshot.len(), 1);

    let json = serde_json::to_value(&snapshot.records[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "server": "EU Central 1",
            "offers": 120,
            "priceUSD": 4.56,
            "valuePer100k": "456000.000000"
        })
    );
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .and(header("user-agent", "Mozilla/5.0 (X11; Linux x86_64) PricewatchTest/1.0"))
        .and(header("accept-language", "en-US"))
        .and(header("referer", "https://market.example.com/"))
        .and(header_exists("accept"))
        .respond_with(html(TWO_CARD_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5_000);
    let fetcher = HttpFetcher::from_config(&config.source).unwrap();
    let body = fetcher
        .fetch(&FetchRequest::from_config(&config.source))
        .await
        .expect("headers should match");

    assert!(String::from_utf8(body).unwrap().contains("EU Central 1"));
}

#[tokio::test]
async fn test_zero_matches_replaces_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .respond_with(html(NO_MATCH_PAGE))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5_000);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();

    let outcome = refresher.refresh().await.unwrap();

    assert!(outcome.is_refreshed());
    let snapshot = refresher.snapshot();
    assert!(snapshot.is_captured());
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_http_error_keeps_previous_snapshot() {
    let mock_server = MockServer::start().await;

    // First request succeeds, every later one fails
    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .respond_with(html(TWO_CARD_PAGE))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5_000);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();

    refresher.refresh().await.unwrap();
    let before = refresher.snapshot();

    let result = refresher.refresh().await;

    assert!(matches!(
        result,
        Err(PricewatchError::Network(FetchError::Status { status: 503, .. }))
    ));
    let after = refresher.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.records, before.records);
    assert_eq!(after.captured_at, before.captured_at);
    assert!(!refresher.cache().is_refreshing());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categories/gold"))
        .respond_with(html(TWO_CARD_PAGE).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1_000);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();

    let result = refresher.refresh().await;

    assert!(matches!(
        result,
        Err(PricewatchError::Network(FetchError::Timeout { .. }))
    ));
    assert!(!refresher.snapshot().is_captured());
    assert!(!refresher.cache().is_refreshing());
}

#[tokio::test]
async fn test_unreachable_upstream() {
    // Nothing listens on port 9 on the loopback interface
    let config = create_test_config("http://127.0.0.1:9", 2_000);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();

    let result = refresher.refresh().await;

    assert!(matches!(result, Err(PricewatchError::Network(_))));
    assert!(!refresher.snapshot().is_captured());
}

/// Fetcher that parks inside `fetch` until released
struct GatedFetcher {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Fetcher for GatedFetcher {
    async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(TWO_CARD_PAGE.as_bytes().to_vec())
    }
}

#[tokio::test]
async fn test_overlapping_refreshes_coalesce() {
    let fetcher = Arc::new(GatedFetcher {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let config = Config::default();
    let refresher = Arc::new(Refresher::new(
        Arc::new(SnapshotCache::new()),
        fetcher.clone(),
        Arc::new(Extractor::from_config(&config.selectors).unwrap()),
        RegionFilter::from_config(&config.filter),
        FetchRequest::from_config(&config.source),
    ));

    let first = tokio::spawn({
        let refresher = Arc::clone(&refresher);
        async move { refresher.refresh().await }
    });

    // Wait until the first refresh is inside the fetcher
    fetcher.entered.notified().await;
    assert!(refresher.cache().is_refreshing());

    let second = refresher.refresh().await.unwrap();
    assert!(!second.is_refreshed());
    assert!(!second.snapshot().is_captured());

    fetcher.release.notify_one();
    let first = first.await.unwrap().unwrap();

    assert!(first.is_refreshed());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(first.snapshot(), &refresher.snapshot()));
    assert_eq!(refresher.snapshot().len(), 1);

    // The guard is free again
    assert!(!refresher.cache().is_refreshing());
}
