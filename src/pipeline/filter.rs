//! Region filter and field derivation
//!
//! Turns raw records into accepted ones: a record is kept iff its label
//! contains the region marker, compared case-insensitively. The filter is
//! stable and never fails.

use crate::config::FilterConfig;
use crate::model::{AcceptedRecord, RawRecord};

/// Keeps records whose label carries a region marker
#[derive(Debug, Clone)]
pub struct RegionFilter {
    marker: String,
}

impl RegionFilter {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_lowercase(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(&config.region_marker)
    }

    /// Returns true if `label` is non-empty and contains the marker
    pub fn matches(&self, label: &str) -> bool {
        !label.is_empty() && label.to_lowercase().contains(&self.marker)
    }

    /// Filters and derives, preserving input order
    pub fn accept(&self, raw: &[RawRecord]) -> Vec<AcceptedRecord> {
        raw.iter()
            .filter(|record| self.matches(&record.server_label))
            .filter_map(AcceptedRecord::from_raw)
            .collect()
    }
}
