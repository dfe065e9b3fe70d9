//! Periodic eviction of idle try-on sessions.
//!
//! Dropping a session drops its uploads, which removes their spooled files.
//! Sessions are evicted by inactivity alone, whatever their phase; a batch
//! still running for an evicted session has its outcome discarded.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sessions::SessionStore;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the expiry loop until `cancel` is triggered.
pub async fn run(
    sessions: Arc<SessionStore>,
    idle_timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
) {
    let max_idle = chrono::Duration::seconds(idle_timeout.as_secs().min(i64::MAX as u64) as i64);

    tracing::info!(
        idle_timeout_secs = idle_timeout.as_secs(),
        interval_secs = interval.as_secs(),
        "Session expiry job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session expiry job stopping");
                break;
            }
            _ = ticker.tick() => {
                let expired = sessions.expire_idle(max_idle).await;
                if expired > 0 {
                    tracing::info!(expired, "Session expiry: dropped idle sessions");
                } else {
                    tracing::debug!("Session expiry: nothing to drop");
                }
            }
        }
    }
}
