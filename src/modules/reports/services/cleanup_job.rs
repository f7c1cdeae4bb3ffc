use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use crate::core::Result;

use super::cache_service::ReportCacheService;

/// Background job that sweeps expired report cache rows.
///
/// Spawned as a tokio task in main.rs; the first sweep runs immediately.
pub struct CacheCleanupJob {
    cache: ReportCacheService,
    period: Duration,
}

impl CacheCleanupJob {
    pub fn new(cache: ReportCacheService, period: Duration) -> Self {
        Self { cache, period }
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.period.as_secs(),
            "Starting report cache cleanup job"
        );

        let mut ticker = interval(self.period);

        loop {
            ticker.tick().await;

            match self.run_once().await {
                Ok(removed) => {
                    if removed > 0 {
                        info!(removed = removed, "Expired report cache rows removed");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error cleaning report cache");
                }
            }
        }
    }

    /// One sweep; safe to run concurrently with another sweep
    pub async fn run_once(&self) -> Result<u64> {
        self.cache.cleanup_expired().await
    }
}
