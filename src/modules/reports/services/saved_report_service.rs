use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::{AppError, Result};
use crate::modules::exports::models::ExportFile;
use crate::modules::exports::services::ExportService;
use crate::modules::reports::models::{
    ExportFormat, ReportExecution, ReportRequest, ReportSchedule, ReportType, SavedReport,
};
use crate::modules::reports::repositories::{ReportExecutionRepository, SavedReportRepository};

use super::report_service::ReportOptions;

/// Options stored in `SavedReport.parameters`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SavedParameters {
    location_id: Option<String>,
    #[serde(flatten)]
    options: ReportOptions,
}

impl SavedParameters {
    fn parse(parameters: &Value) -> std::result::Result<Self, String> {
        if !parameters.is_object() {
            return Err("parameters must be an object".to_string());
        }
        serde_json::from_value(parameters.clone()).map_err(|e| e.to_string())
    }
}

fn default_format() -> ExportFormat {
    ExportFormat::Csv
}

/// Body of `POST /reports/saved`
#[derive(Debug, Deserialize)]
pub struct CreateSavedReport {
    pub name: String,
    pub report_type: ReportType,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
    #[serde(default = "default_format")]
    pub format: ExportFormat,
    #[serde(default)]
    pub schedule: ReportSchedule,
}

fn empty_parameters() -> Value {
    Value::Object(Default::default())
}

/// Outcome of one saved-report run; `file` is set when the execution completed
#[derive(Debug, Clone)]
pub struct SavedReportRun {
    pub execution: ReportExecution,
    pub file: Option<ExportFile>,
}

/// Stores saved report definitions, runs them and records each run as an execution
pub struct SavedReportService {
    exports: Arc<ExportService>,
    saved: Arc<dyn SavedReportRepository>,
    executions: Arc<dyn ReportExecutionRepository>,
}

impl SavedReportService {
    pub fn new(
        exports: Arc<ExportService>,
        saved: Arc<dyn SavedReportRepository>,
        executions: Arc<dyn ReportExecutionRepository>,
    ) -> Self {
        Self {
            exports,
            saved,
            executions,
        }
    }

    async fn timezone(&self, tenant_id: &str) -> Tz {
        self.exports
            .reports()
            .context()
            .timezone
            .get_local_timezone(tenant_id)
            .await
    }

    pub async fn create(&self, tenant_id: &str, body: CreateSavedReport) -> Result<SavedReport> {
        let name = body.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Saved report name is required"));
        }
        SavedParameters::parse(&body.parameters)
            .map_err(|e| AppError::validation(format!("Invalid parameters: {}", e)))?;

        let saved = SavedReport {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: name.to_string(),
            report_type: body.report_type,
            parameters: body.parameters,
            format: body.format,
            schedule: body.schedule,
            is_active: true,
            template_id: None,
        };
        self.saved.create(&saved).await?;

        info!(
            tenant_id = %tenant_id,
            saved_report_id = %saved.id,
            report_type = %saved.report_type,
            schedule = %saved.schedule,
            "Saved report created"
        );
        Ok(saved)
    }

    pub async fn list(&self, tenant_id: &str) -> Result<Vec<SavedReport>> {
        self.saved.list(tenant_id).await
    }

    pub async fn get(&self, tenant_id: &str, id: &str) -> Result<SavedReport> {
        self.saved
            .find(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Saved report {}", id)))
    }

    fn request_for(
        saved: &SavedReport,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Result<(ReportRequest, ReportOptions)> {
        let parameters = SavedParameters::parse(&saved.parameters).map_err(|e| {
            AppError::validation(format!(
                "Saved report {} has invalid parameters: {}",
                saved.id, e
            ))
        })?;
        let (start, end) = saved.schedule.window(now, tz);
        let request = ReportRequest::new(saved.tenant_id.clone(), start, end)
            .with_location(parameters.location_id);
        Ok((request, parameters.options))
    }

    /// Generate and render a saved report for the window its schedule covers at `now`.
    ///
    /// Generation and rendering failures are recorded on the execution rather than
    /// returned; only bookkeeping failures surface as errors.
    pub async fn run(&self, saved: &SavedReport, now: DateTime<Utc>) -> Result<SavedReportRun> {
        if !saved.is_active {
            return Err(AppError::validation(format!(
                "Saved report {} is inactive",
                saved.id
            )));
        }

        let mut execution = ReportExecution::start(saved, now);
        self.executions.create(&execution).await?;

        let tz = self.timezone(&saved.tenant_id).await;
        let outcome = match Self::request_for(saved, now, tz) {
            Ok((request, options)) => {
                self.exports
                    .export(saved.report_type, &request, &options, saved.format)
                    .await
            }
            Err(e) => Err(e),
        };

        let file = match outcome {
            Ok(file) => {
                execution.complete(file.size());
                info!(
                    tenant_id = %saved.tenant_id,
                    saved_report_id = %saved.id,
                    execution_id = %execution.id,
                    size = file.size(),
                    "Saved report executed"
                );
                Some(file)
            }
            Err(e) => {
                error!(
                    tenant_id = %saved.tenant_id,
                    saved_report_id = %saved.id,
                    execution_id = %execution.id,
                    error = %e,
                    "Saved report execution failed"
                );
                execution.fail(e.to_string());
                None
            }
        };

        self.executions.finish(&execution).await?;
        Ok(SavedReportRun { execution, file })
    }

    /// Run one of the tenant's saved reports now
    pub async fn run_by_id(
        &self,
        tenant_id: &str,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<SavedReportRun> {
        let saved = self.get(tenant_id, id).await?;
        self.run(&saved, now).await
    }

    /// Run every scheduled report that has not run since its window closed.
    /// Returns how many runs were started; one report failing does not stop the rest.
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut started = 0;
        for saved in self.saved.list_scheduled().await? {
            let tz = self.timezone(&saved.tenant_id).await;
            let last_started = self
                .executions
                .list_for_report(&saved.tenant_id, &saved.id)
                .await?
                .first()
                .map(|execution| execution.started_at);
            if !saved.schedule.is_due(last_started, now, tz) {
                continue;
            }

            match self.run(&saved, now).await {
                Ok(_) => started += 1,
                Err(e) => warn!(
                    tenant_id = %saved.tenant_id,
                    saved_report_id = %saved.id,
                    error = %e,
                    "Could not run scheduled report"
                ),
            }
        }
        Ok(started)
    }

    /// Past executions of a saved report, newest first
    pub async fn history(&self, tenant_id: &str, saved_report_id: &str) -> Result<Vec<ReportExecution>> {
        self.get(tenant_id, saved_report_id).await?;
        self.executions
            .list_for_report(tenant_id, saved_report_id)
            .await
    }
}
