//! JSON handlers for the price API

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use crate::api::app::AppState;
use crate::model::AcceptedRecord;
use crate::PricewatchError;

const PENDING_MESSAGE: &str = "No server data available yet";
const PENDING_TIP: &str = "Initial scrape takes about 10-15 seconds after server start";
const EMPTY_SCRAPE_MESSAGE: &str = "Scrape completed but no data found";
const IN_FLIGHT_MESSAGE: &str = "A scrape is already in progress and no data has been captured yet";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingResponse {
    status: &'static str,
    message: &'static str,
    tip: &'static str,
    last_scrape_time: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PricesResponse<'a> {
    status: &'static str,
    count: usize,
    last_scrape_time: Option<String>,
    data: &'a [AcceptedRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeResponse<'a> {
    status: &'static str,
    server_count: usize,
    last_scrape_time: Option<String>,
    data: Option<&'a [AcceptedRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    in_flight: bool,
    last_scrape_time: Option<String>,
}

/// `GET /api/prices`
///
/// Never fails. Before the first successful refresh it reports `pending`;
/// afterwards it serves the cached snapshot, however stale.
pub async fn prices_handler(Extension(state): Extension<AppState>) -> Response {
    let snapshot = state.refresher.snapshot();

    if !snapshot.is_captured() {
        return Json(PendingResponse {
            status: "pending",
            message: PENDING_MESSAGE,
            tip: PENDING_TIP,
            last_scrape_time: None,
        })
        .into_response();
    }

    Json(PricesResponse {
        status: "success",
        count: snapshot.len(),
        last_scrape_time: snapshot.captured_at_iso(),
        data: &snapshot.records,
    })
    .into_response()
}

/// `GET /api/scrape`
///
/// Triggers a refresh and waits for it. A refresh already in flight is not
/// joined; the current snapshot is reported instead.
///
/// | Outcome | Status | Body |
/// |---------|--------|------|
/// | records present | 200 | `success` with data |
/// | zero records | 200 | `error`, `data: null`, explanatory message |
/// | in flight, nothing captured yet | 200 | `pending`, `data: null`, message |
/// | upstream failure | 502 | `error` with message |
/// | extraction fault | 500 | `error` with message |
pub async fn scrape_handler(Extension(state): Extension<AppState>) -> Response {
    let outcome = match state.refresher.refresh().await {
        Ok(outcome) => outcome,
        Err(e) => {
            let status = match e {
                PricewatchError::Network(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (
                status,
                Json(ErrorResponse {
                    status: "error",
                    message: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let refreshed = outcome.is_refreshed();
    let snapshot = outcome.into_snapshot();

    if !refreshed && !snapshot.is_captured() {
        return Json(ScrapeResponse {
            status: "pending",
            server_count: 0,
            last_scrape_time: None,
            data: None,
            message: Some(IN_FLIGHT_MESSAGE),
        })
        .into_response();
    }

    if snapshot.is_empty() {
        return Json(ScrapeResponse {
            status: "error",
            server_count: 0,
            last_scrape_time: snapshot.captured_at_iso(),
            data: None,
            message: Some(EMPTY_SCRAPE_MESSAGE),
        })
        .into_response();
    }

    Json(ScrapeResponse {
        status: "success",
        server_count: snapshot.len(),
        last_scrape_time: snapshot.captured_at_iso(),
        data: Some(snapshot.records.as_slice()),
        message: None,
    })
    .into_response()
}

/// `GET /api/health`
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let cache = state.refresher.cache();
    Json(HealthResponse {
        status: "ok",
        in_flight: cache.is_refreshing(),
        last_scrape_time: cache.read().captured_at_iso(),
    })
}
