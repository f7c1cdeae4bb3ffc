use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ReportsConfig;
use crate::core::timezone::format_iso8601;
use crate::core::{AppError, Result};
use crate::modules::exports::models::{
    BulkExportRequest, ExportFile, ExportManifest, ExportOperation, ExportStatus, ManifestEntry,
};
use crate::modules::reports::models::ReportType;

use super::export_queue::ExportQueue;
use super::export_service::ExportService;

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// `name.ext`, `name-2.ext`, ... for files that would collide inside the archive
fn unique_filename(filename: &str, used: &mut HashSet<String>) -> String {
    let (stem, ext) = filename
        .rsplit_once('.')
        .map(|(stem, ext)| (stem.to_string(), format!(".{}", ext)))
        .unwrap_or_else(|| (filename.to_string(), String::new()));

    let mut candidate = filename.to_string();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}-{}{}", stem, n, ext);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Pack rendered files and a `manifest.json` into a deflated ZIP
pub fn package_zip(
    operation_id: Uuid,
    created_at: DateTime<Utc>,
    files: &[(ReportType, ExportFile)],
) -> Result<ExportFile> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::from([MANIFEST_FILENAME.to_string()]);
    let mut entries = Vec::with_capacity(files.len());

    for (report_type, file) in files {
        let filename = unique_filename(&file.filename, &mut used);
        zip.start_file(filename.as_str(), options)?;
        zip.write_all(&file.bytes)?;
        entries.push(ManifestEntry {
            filename,
            report_type: *report_type,
            size: file.size(),
        });
    }

    let manifest = ExportManifest {
        operation_id,
        created_at: format_iso8601(created_at),
        files: entries,
    };
    zip.start_file(MANIFEST_FILENAME, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

    let bytes = zip.finish()?.into_inner();
    Ok(ExportFile {
        filename: format!("bulk-export-{}.zip", operation_id),
        content_type: "application/zip".to_string(),
        bytes,
    })
}

/// Batches several reports into one download
pub struct BulkExportService {
    exports: Arc<ExportService>,
    queue: Arc<ExportQueue>,
    max_reports: usize,
    max_range_days: i64,
    retention: chrono::Duration,
}

impl BulkExportService {
    pub fn new(exports: Arc<ExportService>, queue: Arc<ExportQueue>, config: &ReportsConfig) -> Self {
        Self {
            exports,
            queue,
            max_reports: config.bulk_max_reports,
            max_range_days: config.bulk_max_range_days,
            retention: chrono::Duration::from_std(config.bulk_retention())
                .unwrap_or_else(|_| chrono::Duration::days(1)),
        }
    }

    pub fn queue(&self) -> &Arc<ExportQueue> {
        &self.queue
    }

    /// Forget operations that finished more than the retention window before `now`
    pub async fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let evicted = self.queue.evict_finished(now - self.retention).await;
        if evicted > 0 {
            info!(evicted = evicted, "Evicted finished bulk exports");
        }
        evicted
    }

    /// Queue a bulk export; configs are validated individually when processed
    pub async fn submit(&self, tenant_id: &str, request: BulkExportRequest) -> Result<ExportOperation> {
        if request.reports.is_empty() || request.reports.len() > self.max_reports {
            return Err(AppError::validation(format!(
                "A bulk export takes between 1 and {} reports, got {}",
                self.max_reports,
                request.reports.len()
            )));
        }

        let operation = ExportOperation::new(tenant_id, request, Utc::now());
        info!(
            tenant_id = %tenant_id,
            operation_id = %operation.id,
            reports = operation.reports.len(),
            priority = ?operation.priority,
            "Bulk export queued"
        );
        self.queue.enqueue(operation.clone()).await;
        Ok(operation)
    }

    pub async fn status(&self, tenant_id: &str, id: Uuid) -> Result<ExportOperation> {
        self.queue
            .get(tenant_id, id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Export operation {}", id)))
    }

    pub async fn download(&self, tenant_id: &str, id: Uuid) -> Result<ExportFile> {
        let operation = self.status(tenant_id, id).await?;
        match (operation.status, operation.artifact) {
            (ExportStatus::Completed, Some(artifact)) => Ok(artifact),
            (status, _) => Err(AppError::validation(format!(
                "Export operation {} is {}, nothing to download",
                id, status
            ))),
        }
    }

    /// Process the highest-priority queued operation, if any
    pub async fn process_next(&self) -> Result<Option<Uuid>> {
        match self.queue.dequeue().await {
            Some(id) => {
                self.process(id).await?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Run one operation end to end
    pub async fn process(&self, id: Uuid) -> Result<()> {
        self.queue.update(id, |op| op.start(Utc::now())).await?;
        let operation = self
            .queue
            .snapshot(id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Export operation {}", id)))?;

        let total = operation.reports.len();
        let tz = self
            .exports
            .reports()
            .context()
            .timezone
            .get_local_timezone(&operation.tenant_id)
            .await;
        let mut files: Vec<(ReportType, ExportFile)> = Vec::new();

        for (index, config) in operation.reports.iter().enumerate() {
            let position = index + 1;
            match config.validate(self.max_range_days, tz) {
                Err(reason) => {
                    warn!(
                        operation_id = %id,
                        report = position,
                        reason = %reason,
                        "Skipping invalid bulk export config"
                    );
                    let message = format!("Report {} ({}) skipped: {}", position, config.report_type, reason);
                    self.queue
                        .update(id, |op| {
                            op.warnings.push(message);
                            Ok(())
                        })
                        .await?;
                }
                Ok(valid) => {
                    let request = valid.to_request(&operation.tenant_id);
                    match self
                        .exports
                        .export(valid.report_type, &request, &valid.options, operation.format)
                        .await
                    {
                        Ok(file) => files.push((valid.report_type, file)),
                        Err(e) => {
                            error!(
                                operation_id = %id,
                                report = position,
                                report_type = %valid.report_type,
                                error = %e,
                                "Bulk export report failed"
                            );
                            let message =
                                format!("Report {} ({}) failed: {}", position, valid.report_type, e);
                            self.queue
                                .update(id, |op| {
                                    op.errors.push(message);
                                    Ok(())
                                })
                                .await?;
                        }
                    }
                }
            }

            self.queue
                .update(id, |op| {
                    op.set_progress(position, total);
                    Ok(())
                })
                .await?;
        }

        if files.is_empty() {
            warn!(operation_id = %id, "Bulk export produced no reports");
            return self
                .queue
                .update(id, |op| op.fail("No reports were generated", Utc::now()))
                .await;
        }

        let generated = files.len();
        let artifact = if generated > 1 || operation.compress {
            package_zip(id, operation.created_at, &files)
        } else {
            files
                .pop()
                .map(|(_, file)| file)
                .ok_or_else(|| AppError::internal("bulk export lost its only file"))
        };

        match artifact {
            Ok(artifact) => {
                info!(
                    operation_id = %id,
                    reports_generated = generated,
                    filename = %artifact.filename,
                    size = artifact.size(),
                    "Bulk export completed"
                );
                self.queue
                    .update(id, |op| op.complete(artifact, generated, Utc::now()))
                    .await
            }
            Err(e) => {
                error!(operation_id = %id, error = %e, "Bulk export packaging failed");
                self.queue
                    .update(id, |op| op.fail(e.to_string(), Utc::now()))
                    .await
            }
        }
    }
}
