//! Configuration module for Pricewatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file section is never an error.
//!
//! # Example
//!
//! ```no_run
//! use pricewatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pricewatch.toml")).unwrap();
//! println!("Scraping {} every {}s", config.source.url, config.schedule.interval_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FilterConfig, MatchMode, ScheduleConfig, SelectorConfig, ServerConfig, SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
