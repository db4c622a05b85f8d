//! HTTP API over the snapshot cache
//!
//! - `GET /api/prices` - cached snapshot, or `pending` before the first capture
//! - `GET /api/scrape` - synchronous refresh, then the resulting snapshot
//! - `GET /api/health` - liveness and refresh state

mod app;
mod routes;

pub use app::{build_router, AppState};
pub use routes::{health_handler, prices_handler, scrape_handler, HealthResponse};
