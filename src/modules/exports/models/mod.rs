pub mod bulk_export;
pub mod document;

pub use bulk_export::{
    BulkExportRequest, ExportFile, ExportManifest, ExportOperation, ExportPriority, ExportStatus,
    ManifestEntry, ReportConfig, ValidatedConfig,
};
pub use document::{Cell, ExportDocument, Section};
