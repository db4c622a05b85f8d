//! In-memory snapshot cache
//!
//! The cache is the only shared mutable state in the process. It exposes an
//! atomic read and a guarded replace; the guard also serializes refreshes.

mod snapshot_cache;

pub use snapshot_cache::{RefreshGuard, SnapshotCache};
