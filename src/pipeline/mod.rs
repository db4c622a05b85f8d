//! Scrape pipeline for the listing page
//!
//! This module contains the scrape-extract-cache logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Class-fragment selectors and card extraction
//! - Region filtering and derived fields
//! - Guarded refresh orchestration and the refresh timer

mod extractor;
mod fetcher;
mod filter;
mod refresher;
mod scheduler;
mod selector;

pub use extractor::{parse_offers, parse_price, Extract, Extractor, FieldParse};
pub use fetcher::{build_http_client, FetchError, FetchRequest, Fetcher, HttpFetcher};
pub use filter::RegionFilter;
pub use refresher::{RefreshOutcome, Refresher};
pub use scheduler::spawn_refresh_timer;
pub use selector::{CardSelectors, ClassMatcher};
