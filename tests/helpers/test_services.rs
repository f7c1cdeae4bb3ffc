// Service wiring for tests
//
// Mirrors the construction in main.rs with in-memory stores in place of MySQL.

use std::sync::Arc;

use rust_decimal::Decimal;
use tillreports::config::{CacheTtlConfig, ReportsConfig};
use tillreports::core::TimezoneResolver;
use tillreports::modules::exports::services::{BulkExportService, ExportQueue, ExportService};
use tillreports::modules::reports::repositories::{
    InMemoryReportCacheStore, InMemoryReportExecutionRepository, InMemoryReportRepository,
    InMemorySavedReportRepository,
};
use tillreports::modules::reports::services::{
    ReportCacheService, ReportContext, ReportService, SavedReportService,
};

use super::test_data::*;

pub struct TestServices {
    pub repo: Arc<InMemoryReportRepository>,
    pub cache_store: Arc<InMemoryReportCacheStore>,
    pub reports: Arc<ReportService>,
    pub exports: Arc<ExportService>,
    pub queue: Arc<ExportQueue>,
    pub bulk: Arc<BulkExportService>,
    pub saved: Arc<SavedReportService>,
    pub config: ReportsConfig,
}

impl TestServices {
    pub fn new() -> Self {
        Self::with_repo(Arc::new(InMemoryReportRepository::new()))
    }

    pub fn with_repo(repo: Arc<InMemoryReportRepository>) -> Self {
        let config = ReportsConfig::default();
        let cache_store = Arc::new(InMemoryReportCacheStore::new());
        let cache = ReportCacheService::new(cache_store.clone(), CacheTtlConfig::default());
        let timezone = TimezoneResolver::new(repo.clone(), config.default_timezone);
        let reports = Arc::new(ReportService::new(ReportContext::new(
            repo.clone(),
            cache,
            timezone,
        )));
        let exports = Arc::new(ExportService::new(reports.clone()));
        let queue = Arc::new(ExportQueue::new());
        let bulk = Arc::new(BulkExportService::new(exports.clone(), queue.clone(), &config));
        let saved = Arc::new(SavedReportService::new(
            exports.clone(),
            Arc::new(InMemorySavedReportRepository::new()),
            Arc::new(InMemoryReportExecutionRepository::new()),
        ));

        Self {
            repo,
            cache_store,
            reports,
            exports,
            queue,
            bulk,
            saved,
            config,
        }
    }

    /// One paid order per amount on 2024-01-10, each with a single line of `items` units
    pub async fn seed_orders(&self, amounts: &[Decimal], items: i64) {
        for (i, amount) in amounts.iter().enumerate() {
            let order = paid_order(&format!("o{}", i + 1), *amount, jan(10, 9 + i as u32 % 10), "loc-1");
            let unit = if items == 0 {
                *amount
            } else {
                *amount / Decimal::from(items)
            };
            self.repo
                .add_transaction(TENANT, card_payment(&order))
                .await;
            self.repo
                .add_order(TENANT, order, vec![line("p1", "Latte", items, unit)])
                .await;
        }
    }
}
