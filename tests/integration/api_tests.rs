//! Integration tests for the HTTP API
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` while
//! wiremock plays the upstream marketplace.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pricewatch::api::{build_router, AppState};
use pricewatch::config::Config;
use pricewatch::pipeline::{Extract, FetchRequest, HttpFetcher, RegionFilter};
use pricewatch::{RawRecord, Refresher, SnapshotCache};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EU_PAGE: &str = r#"<html><body>
    <div class="product-card-wrapper a1">
        <div class="product-title">EU Central 1</div>
        <div class="g-chip-counter">120</div>
        <span class="price-amount">$4.56</span>
    </div>
    <div class="product-card-wrapper a1">
        <div class="product-title">NA East</div>
        <div class="g-chip-counter">50</div>
        <span class="price-amount">$3.00</span>
    </div>
    <div class="product-card-wrapper a1">
        <div class="product-title">eu central 2</div>
        <div class="g-chip-counter">7 offers</div>
    </div>
</body></html>"#;

const EMPTY_PAGE: &str = "<html><body><p>No listings</p></body></html>";

struct PanickingExtractor;

impl Extract for PanickingExtractor {
    fn extract(&self, _document: &[u8]) -> Vec<RawRecord> {
        panic!("unexpected markup");
    }
}

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.source.url = format!("{}/listing", base_url);
    config.source.timeout_ms = 5_000;
    config
}

fn test_app(base_url: &str) -> Router {
    let config = test_config(base_url);
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();
    build_router(AppState::new(Arc::new(refresher)), None)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn mount_listing(mock_server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(template)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_prices_pending_before_first_scrape() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/api/prices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(body["message"].is_string());
    assert!(body["tip"].is_string());
    assert!(body["lastScrapeTime"].is_null());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_scrape_then_prices() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, ResponseTemplate::new(200).set_body_string(EU_PAGE)).await;
    let app = test_app(&mock_server.uri());

    let (status, scrape) = get_json(&app, "/api/scrape").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scrape["status"], "success");
    assert_eq!(scrape["serverCount"], 2);
    assert!(scrape.get("message").is_none());
    let data = scrape["data"].as_array().unwrap();
    assert_eq!(data[0]["server"], "EU Central 1");
    assert_eq!(data[0]["valuePer100k"], "456000.000000");
    assert_eq!(data[1]["server"], "eu central 2");
    assert_eq!(data[1]["offers"], 7);
    assert_eq!(data[1]["priceUSD"], 0.0);
    assert_eq!(data[1]["valuePer100k"], "0.000000");

    let (status, prices) = get_json(&app, "/api/prices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices["status"], "success");
    assert_eq!(prices["count"], 2);
    assert_eq!(prices["data"], scrape["data"]);
    assert_eq!(prices["lastScrapeTime"], scrape["lastScrapeTime"]);

    let timestamp = prices["lastScrapeTime"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_scrape_with_no_matches() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, ResponseTemplate::new(200).set_body_string(EMPTY_PAGE)).await;
    let app = test_app(&mock_server.uri());

    let (status, scrape) = get_json(&app, "/api/scrape").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scrape["status"], "error");
    assert_eq!(scrape["serverCount"], 0);
    assert!(scrape["data"].is_null());
    assert!(scrape["lastScrapeTime"].is_string());
    assert_eq!(scrape["message"], "Scrape completed but no data found");

    // An empty capture is still a capture
    let (_, prices) = get_json(&app, "/api/prices").await;
    assert_eq!(prices["status"], "success");
    assert_eq!(prices["count"], 0);
    assert_eq!(prices["data"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn test_scrape_upstream_failure() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, ResponseTemplate::new(500)).await;
    let app = test_app(&mock_server.uri());

    let (status, scrape) = get_json(&app, "/api/scrape").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(scrape["status"], "error");
    assert!(scrape["message"].as_str().unwrap().contains("500"));

    // Prices degrade to pending rather than erroring
    let (status, prices) = get_json(&app, "/api/prices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices["status"], "pending");
}

#[tokio::test]
async fn test_stale_data_served_after_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EU_PAGE))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, ResponseTemplate::new(503)).await;
    let app = test_app(&mock_server.uri());

    let (_, first) = get_json(&app, "/api/scrape").await;
    let (status, _) = get_json(&app, "/api/scrape").await;
    let (_, prices) = get_json(&app, "/api/prices").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(prices["status"], "success");
    assert_eq!(prices["count"], 2);
    assert_eq!(prices["lastScrapeTime"], first["lastScrapeTime"]);
}

#[tokio::test]
async fn test_scrape_extraction_fault() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, ResponseTemplate::new(200).set_body_string(EU_PAGE)).await;
    let config = test_config(&mock_server.uri());
    let cache = Arc::new(SnapshotCache::new());
    let refresher = Refresher::new(
        Arc::clone(&cache),
        Arc::new(HttpFetcher::from_config(&config.source).unwrap()),
        Arc::new(PanickingExtractor),
        RegionFilter::from_config(&config.filter),
        FetchRequest::from_config(&config.source),
    );
    let app = build_router(AppState::new(Arc::new(refresher)), None);

    let (status, scrape) = get_json(&app, "/api/scrape").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(scrape["status"], "error");
    assert!(scrape["message"].is_string());
    assert!(!cache.is_refreshing());

    let (_, prices) = get_json(&app, "/api/prices").await;
    assert_eq!(prices["status"], "pending");
}

#[tokio::test]
async fn test_scrape_while_first_refresh_in_flight() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, ResponseTemplate::new(200).set_body_string(EU_PAGE)).await;
    let config = test_config(&mock_server.uri());
    let cache = Arc::new(SnapshotCache::new());
    let refresher = Refresher::from_config(&config, Arc::clone(&cache)).unwrap();
    let app = build_router(AppState::new(Arc::new(refresher)), None);

    let guard = cache.try_begin_refresh().unwrap();
    let (status, scrape) = get_json(&app, "/api/scrape").await;
    drop(guard);

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scrape["status"], "pending");
    assert_eq!(scrape["serverCount"], 0);
    assert!(scrape["data"].is_null());
    assert!(scrape["lastScrapeTime"].is_null());
    assert_ne!(scrape["message"], "Scrape completed but no data found");
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;
    let app = test_app(&mock_server.uri());

    let (status, body) = get_json(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["inFlight"], false);
    assert!(body["lastScrapeTime"].is_null());
}

#[tokio::test]
async fn test_static_dir_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Prices</h1>").unwrap();

    let config = Config::default();
    let refresher = Refresher::from_config(&config, Arc::new(SnapshotCache::new())).unwrap();
    let app = build_router(AppState::new(Arc::new(refresher)), Some(dir.path()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>Prices</h1>");
}
