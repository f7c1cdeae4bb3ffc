//! Report exports: CSV/XLSX/PDF rendering and queued bulk exports.

pub mod controllers;
pub mod models;
pub mod services;

pub use models::{ExportDocument, ExportFile, ExportOperation, ExportStatus};
pub use services::{BulkExportService, ExportQueue, ExportService, ExportWorker};
