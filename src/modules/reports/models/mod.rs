pub mod common;
pub mod facts;
pub mod operations;
pub mod payments;
pub mod products;
pub mod report_cache;
pub mod report_type;
pub mod sales;
pub mod saved_report;
pub mod summary;

pub use common::{
    DateRange, LocationInfo, OrderTotalsComparison, ProductSales, ReportMetadata, ReportRequest,
};
pub use facts::{
    CashierRef, OrderFact, OrderLineFact, OrderStatus, OrderStatusCounts, PaymentMethod,
    PaymentTotals, ReportScope, StoreLocation, TransactionFact, TransactionStatus,
};
pub use operations::OperationsReport;
pub use payments::PaymentsReport;
pub use products::ProductsReport;
pub use report_cache::CachedReport;
pub use report_type::{ExportFormat, ReportType, TrendPeriod};
pub use sales::SalesReport;
pub use saved_report::{ExecutionStatus, ReportExecution, ReportSchedule, ReportTemplate, SavedReport};
pub use summary::SummaryReport;
