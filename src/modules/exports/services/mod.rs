pub mod bulk_export_service;
pub mod csv_renderer;
pub mod export_queue;
pub mod export_service;
pub mod export_worker;
pub mod pdf_renderer;
pub mod report_documents;
pub mod report_exports;
pub mod xlsx_renderer;

pub use bulk_export_service::{package_zip, BulkExportService, MANIFEST_FILENAME};
pub use csv_renderer::render_csv;
pub use export_queue::ExportQueue;
pub use export_service::ExportService;
pub use export_worker::ExportWorker;
pub use pdf_renderer::render_pdf;
pub use report_documents::{ReportDetails, PDF_DETAIL_LIMIT, PDF_PRODUCT_LIMIT};
pub use report_exports::*;
pub use xlsx_renderer::render_xlsx;
