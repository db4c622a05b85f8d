//! Refresh orchestration
//!
//! A refresh runs Fetcher → Extractor → RegionFilter → SnapshotCache:
//!
//! ```text
//! refresh()
//!     │
//!     ├─ guard busy ──────────────► Coalesced(current snapshot)
//!     │
//!     └─► fetch ── error ─────────► Err(Network), snapshot untouched
//!           └─► extract ── fault ─► Err(Extraction), snapshot untouched
//!                 └─► accept
//!                       └─► commit ► Refreshed(new snapshot)
//! ```
//!
//! The guard is released on every path, including cancellation of the
//! refresh future.

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::model::Snapshot;
use crate::pipeline::extractor::{Extract, Extractor};
use crate::pipeline::fetcher::{FetchError, FetchRequest, Fetcher, HttpFetcher};
use crate::pipeline::filter::RegionFilter;
use crate::PricewatchError;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slack allowed on top of the fetch timeout before the refresh gives up
/// on a fetcher that ignores its own deadline
const FETCH_GRACE: Duration = Duration::from_secs(1);

/// What a refresh request resulted in
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// This call fetched and committed a new snapshot
    Refreshed(Arc<Snapshot>),

    /// Another refresh was running; this call returned the current snapshot
    Coalesced(Arc<Snapshot>),
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            Self::Refreshed(snapshot) | Self::Coalesced(snapshot) => snapshot,
        }
    }

    pub fn into_snapshot(self) -> Arc<Snapshot> {
        match self {
            Self::Refreshed(snapshot) | Self::Coalesced(snapshot) => snapshot,
        }
    }

    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed(_))
    }
}

/// Sole writer of the snapshot cache
pub struct Refresher {
    cache: Arc<SnapshotCache>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extract>,
    filter: RegionFilter,
    request: FetchRequest,
}

impl Refresher {
    pub fn new(
        cache: Arc<SnapshotCache>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extract>,
        filter: RegionFilter,
        request: FetchRequest,
    ) -> Self {
        Self {
            cache,
            fetcher,
            extractor,
            filter,
            request,
        }
    }

    /// Wires an HTTP-backed refresher from configuration
    pub fn from_config(config: &Config, cache: Arc<SnapshotCache>) -> Result<Self, PricewatchError> {
        let fetcher = HttpFetcher::from_config(&config.source)?;
        let extractor = Extractor::from_config(&config.selectors)?;

        Ok(Self::new(
            cache,
            Arc::new(fetcher),
            Arc::new(extractor),
            RegionFilter::from_config(&config.filter),
            FetchRequest::from_config(&config.source),
        ))
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Current snapshot, without triggering anything
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.cache.read()
    }

    /// Runs one refresh, or returns immediately if one is already running
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshOutcome::Refreshed)` - New snapshot committed (possibly with zero records)
    /// * `Ok(RefreshOutcome::Coalesced)` - Another refresh held the guard
    /// * `Err(PricewatchError::Network)` - Fetch failed or timed out
    /// * `Err(PricewatchError::Extraction)` - Extraction could not complete
    pub async fn refresh(&self) -> Result<RefreshOutcome, PricewatchError> {
        let Some(guard) = self.cache.try_begin_refresh() else {
            tracing::info!("Refresh already in flight, returning current snapshot");
            return Ok(RefreshOutcome::Coalesced(self.cache.read()));
        };

        let started = Instant::now();
        tracing::info!("Starting refresh from {}", self.request.url);

        let document = match self.fetch().await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Refresh failed, keeping previous snapshot: {}", e);
                return Err(e.into());
            }
        };

        let extractor = Arc::clone(&self.extractor);
        let raw = match tokio::task::spawn_blocking(move || extractor.extract(&document)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Extraction fault, keeping previous snapshot: {}", e);
                return Err(PricewatchError::Extraction(e.to_string()));
            }
        };

        let accepted = self.filter.accept(&raw);
        for record in &accepted {
            tracing::debug!("Accepted {}", record);
        }
        if accepted.is_empty() {
            tracing::warn!("Refresh found no matching records among {} cards", raw.len());
        }

        let matched = accepted.len();
        let snapshot = guard.commit(accepted, Utc::now());

        tracing::info!(
            "Refresh complete: {} of {} cards matched in {:.2}s",
            matched,
            raw.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(RefreshOutcome::Refreshed(snapshot))
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let deadline = self.request.timeout + FETCH_GRACE;
        match tokio::time::timeout(deadline, self.fetcher.fetch(&self.request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: self.request.url.clone(),
            }),
        }
    }
}
