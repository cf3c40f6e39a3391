use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use super::SessionStore;

/// Periodically drop sessions whose refresh token can no longer be used.
///
/// Returns `None` when `interval_secs` is zero.
pub fn spawn_purge_task(
    store: Arc<dyn SessionStore>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Session purge disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Purged {} expired sessions", removed),
                Err(e) => tracing::warn!("Session purge failed: {}", e),
            }
        }
    }))
}
