//! Snapshot cache with a single-writer refresh guard
//!
//! Readers clone an `Arc<Snapshot>` under a short read lock and never wait on
//! a refresh in progress. Writers must first win the in-flight flag through
//! [`SnapshotCache::try_begin_refresh`]; the returned guard is the only way
//! to replace the snapshot, and it clears the flag when dropped.

use crate::model::{AcceptedRecord, Snapshot};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the latest accepted snapshot and the in-flight refresh flag
#[derive(Debug, Default)]
pub struct SnapshotCache {
    current: RwLock<Arc<Snapshot>>,
    in_flight: AtomicBool,
}

impl SnapshotCache {
    /// Creates a cache holding the empty, never-captured snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot
    ///
    /// The returned value is either fully the old or fully the new snapshot;
    /// a replacement only swaps the `Arc`.
    pub fn read(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Returns true while a refresh holds the guard
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Attempts to claim the in-flight flag
    ///
    /// # Returns
    ///
    /// * `Some(RefreshGuard)` - This caller owns the refresh until the guard drops
    /// * `None` - Another refresh is already running
    pub fn try_begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard { cache: self })
    }

    fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&snapshot);
        snapshot
    }
}

/// Exclusive right to replace the cached snapshot
///
/// Dropping the guard, whether after a commit, an error, a panic or a
/// cancelled future, clears the in-flight flag.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    cache: &'a SnapshotCache,
}

impl RefreshGuard<'_> {
    /// Replaces records and capture time together and releases the guard
    pub fn commit(self, records: Vec<AcceptedRecord>, captured_at: DateTime<Utc>) -> Arc<Snapshot> {
        self.cache.replace(Snapshot::new(records, captured_at))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.cache.in_flight.store(false, Ordering::Release);
    }
}
