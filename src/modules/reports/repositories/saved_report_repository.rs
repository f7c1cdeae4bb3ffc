use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::MySqlPool;
use tokio::sync::RwLock;

use crate::core::{AppError, Result};
use crate::modules::reports::models::{ReportSchedule, SavedReport};

/// Stored report definitions
#[async_trait]
pub trait SavedReportRepository: Send + Sync {
    async fn create(&self, saved: &SavedReport) -> Result<()>;

    async fn find(&self, tenant_id: &str, id: &str) -> Result<Option<SavedReport>>;

    async fn list(&self, tenant_id: &str) -> Result<Vec<SavedReport>>;

    /// Active reports with a schedule, across all tenants
    async fn list_scheduled(&self) -> Result<Vec<SavedReport>>;
}

pub struct MySqlSavedReportRepository {
    pool: MySqlPool,
}

impl MySqlSavedReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_SAVED: &str = r#"
    SELECT id, tenant_id, name, report_type, parameters, format, schedule,
           is_active, template_id
    FROM saved_reports
"#;

#[async_trait]
impl SavedReportRepository for MySqlSavedReportRepository {
    async fn create(&self, saved: &SavedReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_reports (
                id, tenant_id, name, report_type, parameters, format, schedule,
                is_active, template_id
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&saved.id)
        .bind(&saved.tenant_id)
        .bind(&saved.name)
        .bind(saved.report_type.as_str())
        .bind(Json(&saved.parameters))
        .bind(saved.format.to_string())
        .bind(saved.schedule.as_str())
        .bind(saved.is_active)
        .bind(&saved.template_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, tenant_id: &str, id: &str) -> Result<Option<SavedReport>> {
        let row = sqlx::query_as::<_, SavedReportRow>(&format!(
            "{} WHERE tenant_id = ? AND id = ?",
            SELECT_SAVED
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SavedReport::try_from).transpose()
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<SavedReport>> {
        let rows = sqlx::query_as::<_, SavedReportRow>(&format!(
            "{} WHERE tenant_id = ? ORDER BY created_at DESC",
            SELECT_SAVED
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SavedReport::try_from).collect()
    }

    async fn list_scheduled(&self) -> Result<Vec<SavedReport>> {
        let rows = sqlx::query_as::<_, SavedReportRow>(&format!(
            "{} WHERE is_active = TRUE AND schedule <> 'none'",
            SELECT_SAVED
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SavedReport::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct SavedReportRow {
    id: String,
    tenant_id: String,
    name: String,
    report_type: String,
    parameters: Json<serde_json::Value>,
    format: String,
    schedule: String,
    is_active: bool,
    template_id: Option<String>,
}

impl TryFrom<SavedReportRow> for SavedReport {
    type Error = AppError;

    fn try_from(row: SavedReportRow) -> Result<Self> {
        Ok(SavedReport {
            report_type: row.report_type.parse().map_err(AppError::Internal)?,
            format: row.format.parse().map_err(AppError::Internal)?,
            schedule: row.schedule.parse().map_err(AppError::Internal)?,
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            parameters: row.parameters.0,
            is_active: row.is_active,
            template_id: row.template_id,
        })
    }
}

#[derive(Default)]
pub struct InMemorySavedReportRepository {
    reports: RwLock<Vec<SavedReport>>,
}

impl InMemorySavedReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedReportRepository for InMemorySavedReportRepository {
    async fn create(&self, saved: &SavedReport) -> Result<()> {
        let mut reports = self.reports.write().await;
        if reports.iter().any(|r| r.id == saved.id) {
            return Err(AppError::validation(format!(
                "Saved report {} already exists",
                saved.id
            )));
        }
        reports.push(saved.clone());
        Ok(())
    }

    async fn find(&self, tenant_id: &str, id: &str) -> Result<Option<SavedReport>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .find(|r| r.tenant_id == tenant_id && r.id == id)
            .cloned())
    }

    async fn list(&self, tenant_id: &str) -> Result<Vec<SavedReport>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .rev()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn list_scheduled(&self) -> Result<Vec<SavedReport>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| r.is_active && r.schedule != ReportSchedule::None)
            .cloned()
            .collect())
    }
}
