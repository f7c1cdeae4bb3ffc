pub mod aggregation;
pub mod cache_service;
pub mod cleanup_job;
pub mod context;
pub mod invalidation;
pub mod operations_service;
pub mod payment_service;
pub mod product_service;
pub mod report_service;
pub mod sales_service;
pub mod saved_report_scheduler;
pub mod saved_report_service;
pub mod summary_service;

pub use cache_service::ReportCacheService;
pub use cleanup_job::CacheCleanupJob;
pub use context::ReportContext;
pub use invalidation::{CacheInvalidator, EntityKind};
pub use operations_service::OperationsReportService;
pub use payment_service::{consolidate_payment_reports, PaymentReportService};
pub use product_service::{ProductReportOptions, ProductReportService};
pub use report_service::{ReportOptions, ReportService};
pub use sales_service::SalesReportService;
pub use saved_report_scheduler::SavedReportScheduler;
pub use saved_report_service::{CreateSavedReport, SavedReportRun, SavedReportService};
pub use summary_service::SummaryReportService;
