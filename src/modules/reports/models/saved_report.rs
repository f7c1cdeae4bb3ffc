use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::core::timezone::local_midnight;

use super::report_type::{ExportFormat, ReportType};

/// How often a saved report runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSchedule {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl ReportSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSchedule::None => "none",
            ReportSchedule::Daily => "daily",
            ReportSchedule::Weekly => "weekly",
            ReportSchedule::Monthly => "monthly",
        }
    }

    /// Date window covered by a run at `now`, in the tenant's local calendar: the last
    /// complete day, the last seven complete days, or the previous calendar month.
    /// Unscheduled reports cover the last 30 days.
    pub fn window(&self, now: DateTime<Utc>, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.with_timezone(&tz).date_naive();
        let days_back = |days: i64| {
            (
                local_midnight(today - Duration::days(days), tz),
                local_midnight(today, tz),
            )
        };
        match self {
            ReportSchedule::Daily => days_back(1),
            ReportSchedule::Weekly => days_back(7),
            ReportSchedule::Monthly => {
                let first_this_month = today.with_day(1).unwrap_or(today);
                let last_prev_month = first_this_month - Duration::days(1);
                let first_prev_month = last_prev_month.with_day(1).unwrap_or(last_prev_month);
                (
                    local_midnight(first_prev_month, tz),
                    local_midnight(first_this_month, tz),
                )
            }
            ReportSchedule::None => days_back(30),
        }
    }

    /// A scheduled report is due when it has not started since its current window closed
    pub fn is_due(&self, last_started: Option<DateTime<Utc>>, now: DateTime<Utc>, tz: Tz) -> bool {
        if *self == ReportSchedule::None {
            return false;
        }
        let (_, window_end) = self.window(now, tz);
        last_started.map_or(true, |started| started < window_end)
    }
}

impl fmt::Display for ReportSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(ReportSchedule::None),
            "daily" => Ok(ReportSchedule::Daily),
            "weekly" => Ok(ReportSchedule::Weekly),
            "monthly" => Ok(ReportSchedule::Monthly),
            _ => Err(format!("Invalid schedule: {}", s)),
        }
    }
}

/// A user's stored report definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub report_type: ReportType,
    /// Generator options (location_id, group_by, limit, ...)
    pub parameters: Value,
    pub format: ExportFormat,
    pub schedule: ReportSchedule,
    pub is_active: bool,
    pub template_id: Option<String>,
}

/// Reusable starting point for saved reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub report_type: ReportType,
    pub default_parameters: Value,
    pub is_system: bool,
}

impl ReportTemplate {
    /// Instantiate a saved report, with `overrides` layered on the template defaults
    pub fn instantiate(
        &self,
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        overrides: Value,
        format: ExportFormat,
        schedule: ReportSchedule,
    ) -> SavedReport {
        let mut parameters = self.default_parameters.clone();
        if let (Value::Object(base), Value::Object(extra)) = (&mut parameters, overrides) {
            for (key, value) in extra {
                base.insert(key, value);
            }
        }

        SavedReport {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            report_type: self.report_type,
            parameters,
            format,
            schedule,
            is_active: true,
            template_id: Some(self.id.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Audit row for one run of a saved report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExecution {
    pub id: String,
    pub saved_report_id: String,
    pub tenant_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub output_size: Option<i64>,
}

impl ReportExecution {
    pub fn start(saved_report: &SavedReport, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            saved_report_id: saved_report.id.clone(),
            tenant_id: saved_report.tenant_id.clone(),
            status: ExecutionStatus::Running,
            started_at: now,
            completed_at: None,
            error_message: None,
            output_size: None,
        }
    }

    pub fn complete(&mut self, output_size: usize) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.output_size = Some(output_size as i64);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(message.into());
    }
}
