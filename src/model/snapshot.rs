//! The cached result of the latest successful refresh

use crate::model::AcceptedRecord;
use chrono::{DateTime, SecondsFormat, Utc};

/// Accepted records plus the time they were captured
///
/// A snapshot is never mutated after construction; the cache swaps whole
/// snapshots instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Records in extraction order
    pub records: Vec<AcceptedRecord>,

    /// When the records were captured; `None` until the first successful refresh
    pub captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The empty snapshot held before any refresh has succeeded
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(records: Vec<AcceptedRecord>, captured_at: DateTime<Utc>) -> Self {
        Self {
            records,
            captured_at: Some(captured_at),
        }
    }

    /// Returns true once at least one refresh has succeeded
    pub fn is_captured(&self) -> bool {
        self.captured_at.is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture time as ISO-8601 UTC with millisecond precision
    pub fn captured_at_iso(&self) -> Option<String> {
        self.captured_at.map(format_timestamp)
    }
}

/// Formats a timestamp the way the API reports it (`2024-05-01T12:00:00.000Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
