use std::sync::Arc;

use chrono::Duration;
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::timezone::trunc_date_local;
use crate::core::{AppError, Result};
use crate::modules::exports::models::ExportFile;
use crate::modules::reports::models::{
    ExportFormat, ReportMetadata, ReportRequest, ReportScope, ReportType,
};
use crate::modules::reports::services::{ReportOptions, ReportService};

use super::report_documents::ReportDetails;
use super::report_exports::render_report;

/// Generates a report and renders it to a downloadable file
pub struct ExportService {
    reports: Arc<ReportService>,
}

impl ExportService {
    pub fn new(reports: Arc<ReportService>) -> Self {
        Self { reports }
    }

    pub fn reports(&self) -> &Arc<ReportService> {
        &self.reports
    }

    /// `{report_type}-report-{start}-{end}.{ext}` in local dates of `tz`, with the last
    /// covered day as `end`
    pub fn filename(
        report_type: ReportType,
        metadata: &ReportMetadata,
        format: ExportFormat,
        tz: Tz,
    ) -> String {
        let range = &metadata.date_range;
        let (start, end) = match (range.start_datetime(), range.end_datetime()) {
            (Some(start), Some(end)) if end > start => (
                trunc_date_local(start, tz).to_string(),
                trunc_date_local(end - Duration::seconds(1), tz).to_string(),
            ),
            _ => (range.start_day().to_string(), range.end_day().to_string()),
        };
        format!(
            "{}-report-{}-{}.{}",
            report_type,
            start,
            end,
            format.extension()
        )
    }

    /// Re-read detail rows using the filters recorded in the report's own metadata
    pub async fn load_details(
        &self,
        report_type: ReportType,
        metadata: &ReportMetadata,
    ) -> Result<ReportDetails> {
        if !matches!(report_type, ReportType::Sales | ReportType::Payments) {
            return Ok(ReportDetails::default());
        }

        let range = &metadata.date_range;
        let (start, end) = match (range.start_datetime(), range.end_datetime()) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::export(format!(
                    "{} report metadata has no usable date range",
                    report_type
                )))
            }
        };
        let scope = ReportScope::new(
            metadata.tenant_id.clone(),
            start,
            end,
            metadata.location_info.location_id.clone(),
        );

        let repo = &self.reports.context().repo;
        let details = match report_type {
            ReportType::Sales => ReportDetails {
                orders: repo.completed_orders(&scope).await?,
                ..ReportDetails::default()
            },
            _ => ReportDetails {
                transactions: repo.payment_transactions(&scope).await?,
                ..ReportDetails::default()
            },
        };
        Ok(details)
    }

    /// Render an already generated report payload
    pub async fn render(
        &self,
        report_type: ReportType,
        payload: &Value,
        format: ExportFormat,
    ) -> Result<ExportFile> {
        let metadata: ReportMetadata = serde_json::from_value(payload.clone())?;
        let details = self.load_details(report_type, &metadata).await?;
        let bytes = render_report(report_type, format, payload, &details)?;
        let tz = self
            .reports
            .context()
            .timezone
            .get_local_timezone(&metadata.tenant_id)
            .await;

        Ok(ExportFile {
            filename: Self::filename(report_type, &metadata, format, tz),
            content_type: format.content_type().to_string(),
            bytes,
        })
    }

    #[instrument(skip(self, request, options), fields(tenant_id = %request.tenant_id))]
    pub async fn export(
        &self,
        report_type: ReportType,
        request: &ReportRequest,
        options: &ReportOptions,
        format: ExportFormat,
    ) -> Result<ExportFile> {
        let payload = self.reports.generate(report_type, request, options).await?;
        let file = self.render(report_type, &payload, format).await?;

        info!(
            report_type = %report_type,
            format = %format,
            filename = %file.filename,
            size = file.size(),
            "Report exported"
        );
        Ok(file)
    }
}
