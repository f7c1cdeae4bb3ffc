use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info};

use crate::core::Result;

use super::saved_report_service::SavedReportService;

/// Background job that runs scheduled saved reports once per schedule window.
///
/// Spawned as a tokio task in main.rs next to the cache cleanup job.
pub struct SavedReportScheduler {
    service: Arc<SavedReportService>,
    period: Duration,
}

impl SavedReportScheduler {
    pub fn new(service: Arc<SavedReportService>, period: Duration) -> Self {
        Self { service, period }
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.period.as_secs(),
            "Starting saved report scheduler"
        );

        let mut ticker = interval(self.period);

        loop {
            ticker.tick().await;

            match self.run_once().await {
                Ok(started) => {
                    if started > 0 {
                        info!(started = started, "Scheduled reports executed");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Error running scheduled reports");
                }
            }
        }
    }

    pub async fn run_once(&self) -> Result<usize> {
        self.service.run_due(Utc::now()).await
    }
}
