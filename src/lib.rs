//! Pricewatch: a marketplace price scraper with an in-memory snapshot
//!
//! This crate periodically fetches a marketplace listing page, extracts
//! pricing records for one regional segment, keeps the freshest snapshot in
//! memory and serves it over a small HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod model;
pub mod pipeline;

use thiserror::Error;

/// Main error type for Pricewatch operations
#[derive(Debug, Error)]
pub enum PricewatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] pipeline::FetchError),

    #[error("Extraction fault: {0}")]
    Extraction(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Pricewatch operations
pub type Result<T> = std::result::Result<T, PricewatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::SnapshotCache;
pub use config::Config;
pub use model::{AcceptedRecord, RawRecord, Snapshot};
pub use pipeline::{RefreshOutcome, Refresher};
