pub mod cache_repository;
pub mod execution_repository;
pub mod memory_repository;
pub mod report_repository;
pub mod saved_report_repository;

pub use cache_repository::{InMemoryReportCacheStore, MySqlReportCacheStore, ReportCacheStore};
pub use execution_repository::{
    InMemoryReportExecutionRepository, MySqlReportExecutionRepository, ReportExecutionRepository,
};
pub use memory_repository::InMemoryReportRepository;
pub use report_repository::{MySqlReportRepository, ReportRepository};
pub use saved_report_repository::{
    InMemorySavedReportRepository, MySqlSavedReportRepository, SavedReportRepository,
};
