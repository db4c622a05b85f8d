//! Fixed-interval refresh timer
//!
//! Each tick spawns a fire-and-forget refresh. Ticks never wait on a slow
//! refresh; overlap is resolved by the refresh guard, which turns the extra
//! tick into a no-op.

use crate::pipeline::refresher::Refresher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawns the timer task driving periodic refreshes
///
/// # Arguments
///
/// * `refresher` - Shared refresher to trigger
/// * `period` - Time between ticks
/// * `run_on_start` - Fire the first refresh immediately instead of after one period
///
/// # Returns
///
/// The handle of the timer task; aborting it stops future ticks.
pub fn spawn_refresh_timer(
    refresher: Arc<Refresher>,
    period: Duration,
    run_on_start: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = if run_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + period
        };
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Refresh timer started (every {}s)", period.as_secs());

        loop {
            ticker.tick().await;
            tracing::debug!("Timer tick, triggering refresh");

            let refresher = Arc::clone(&refresher);
            tokio::spawn(async move {
                // Failures are already logged by the refresher
                let _ = refresher.refresh().await;
            });
        }
    })
}
