use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::timezone::{format_iso8601, parse_boundary};
use crate::core::{AppError, Result};
use crate::modules::reports::models::{ExportFormat, ReportRequest, ReportType};
use crate::modules::reports::services::ReportOptions;

/// Lifecycle of a bulk export operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl ExportStatus {
    pub fn can_transition_to(&self, next: ExportStatus) -> bool {
        matches!(
            (self, next),
            (ExportStatus::Queued, ExportStatus::Processing)
                | (ExportStatus::Queued, ExportStatus::Failed)
                | (ExportStatus::Processing, ExportStatus::Completed)
                | (ExportStatus::Processing, ExportStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Completed | ExportStatus::Failed)
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::Queued => write!(f, "queued"),
            ExportStatus::Processing => write!(f, "processing"),
            ExportStatus::Completed => write!(f, "completed"),
            ExportStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPriority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl ExportPriority {
    pub const LEVELS: [ExportPriority; 4] = [
        ExportPriority::Urgent,
        ExportPriority::High,
        ExportPriority::Normal,
        ExportPriority::Low,
    ];

    /// Queue index, 0 is served first
    pub fn level(&self) -> usize {
        match self {
            ExportPriority::Urgent => 0,
            ExportPriority::High => 1,
            ExportPriority::Normal => 2,
            ExportPriority::Low => 3,
        }
    }
}

/// One report of a bulk export, as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub report_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub options: ReportOptions,
}

/// A config that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub report_type: ReportType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location_id: Option<String>,
    pub options: ReportOptions,
}

impl ValidatedConfig {
    /// Bulk exports always read current data
    pub fn to_request(&self, tenant_id: &str) -> ReportRequest {
        ReportRequest::new(tenant_id, self.start_date, self.end_date)
            .with_location(self.location_id.clone())
            .with_cache(false)
    }
}

impl ReportConfig {
    /// Check a submitted config; bare dates are read in the tenant's timezone `tz`
    pub fn validate(
        &self,
        max_range_days: i64,
        tz: Tz,
    ) -> std::result::Result<ValidatedConfig, String> {
        let report_type: ReportType = self.report_type.parse()?;
        let start_date = parse_boundary(&self.start_date, false, tz)?;
        let end_date = parse_boundary(&self.end_date, true, tz)?;

        if start_date >= end_date {
            return Err(format!(
                "start_date {} must be before end_date {}",
                self.start_date, self.end_date
            ));
        }
        let days = ReportRequest::new("", start_date, end_date).range_days();
        if days > max_range_days {
            return Err(format!(
                "date range of {} days exceeds the maximum of {} days",
                days, max_range_days
            ));
        }

        Ok(ValidatedConfig {
            report_type,
            start_date,
            end_date,
            location_id: self.location_id.clone(),
            options: self.options,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkExportRequest {
    pub reports: Vec<ReportConfig>,
    pub format: ExportFormat,
    #[serde(default)]
    pub compress: bool,
    #[serde(default)]
    pub priority: ExportPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub report_type: ReportType,
    pub size: usize,
}

/// `manifest.json` of a bulk export archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub operation_id: Uuid,
    pub created_at: String,
    pub files: Vec<ManifestEntry>,
}

/// A rendered file held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A bulk export and its progress
#[derive(Debug, Clone, Serialize)]
pub struct ExportOperation {
    pub id: Uuid,
    pub tenant_id: String,
    pub status: ExportStatus,
    pub priority: ExportPriority,
    pub format: ExportFormat,
    pub compress: bool,
    pub reports: Vec<ReportConfig>,
    /// 0-100
    pub progress: u8,
    pub reports_generated: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub download_filename: Option<String>,
    #[serde(skip)]
    pub artifact: Option<ExportFile>,
}

impl ExportOperation {
    pub fn new(tenant_id: impl Into<String>, request: BulkExportRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            status: ExportStatus::Queued,
            priority: request.priority,
            format: request.format,
            compress: request.compress,
            reports: request.reports,
            progress: 0,
            reports_generated: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            created_at: now,
            started_at: None,
            completed_at: None,
            download_filename: None,
            artifact: None,
        }
    }

    fn transition(&mut self, next: ExportStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Export {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(ExportStatus::Processing)?;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn set_progress(&mut self, done: usize, total: usize) {
        self.progress = if total == 0 {
            100
        } else {
            ((done.min(total) * 100) / total) as u8
        };
    }

    pub fn complete(&mut self, artifact: ExportFile, reports_generated: usize, now: DateTime<Utc>) -> Result<()> {
        self.transition(ExportStatus::Completed)?;
        self.progress = 100;
        self.reports_generated = reports_generated;
        self.download_filename = Some(artifact.filename.clone());
        self.artifact = Some(artifact);
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        self.transition(ExportStatus::Failed)?;
        self.errors.push(message.into());
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn manifest_created_at(&self) -> String {
        format_iso8601(self.created_at)
    }
}
