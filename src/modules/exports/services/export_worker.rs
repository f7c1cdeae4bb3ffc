use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::core::Result;

use super::bulk_export_service::BulkExportService;

/// Background worker draining the bulk export queue.
///
/// Handles one operation end to end at a time; after a tick it keeps going until the
/// queue is empty, then waits for the next tick.
pub struct ExportWorker {
    service: Arc<BulkExportService>,
    poll_interval: Duration,
}

impl ExportWorker {
    pub fn new(service: Arc<BulkExportService>, poll_interval: Duration) -> Self {
        Self {
            service,
            poll_interval,
        }
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Starting bulk export worker"
        );

        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            match self.run_once().await {
                Ok(processed) => {
                    if processed > 0 {
                        info!(processed = processed, "Bulk exports processed");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error processing bulk exports");
                }
            }
        }
    }

    /// Drain the queue, returning how many operations were processed.
    /// Finished operations past the retention window are dropped afterwards.
    pub async fn run_once(&self) -> Result<usize> {
        let mut processed = 0;
        while let Some(id) = self.service.process_next().await? {
            debug!(operation_id = %id, "Bulk export operation finished");
            processed += 1;
        }
        self.service.evict_expired(Utc::now()).await;
        Ok(processed)
    }
}
