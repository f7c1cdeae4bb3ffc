use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;
use tokio::sync::RwLock;

use crate::core::{AppError, Result};
use crate::modules::reports::models::{ExecutionStatus, ReportExecution};

/// Append-only log of saved report runs
#[async_trait]
pub trait ReportExecutionRepository: Send + Sync {
    async fn create(&self, execution: &ReportExecution) -> Result<()>;

    /// Record the final status of a running execution
    async fn finish(&self, execution: &ReportExecution) -> Result<()>;

    /// Executions of one saved report, newest first
    async fn list_for_report(
        &self,
        tenant_id: &str,
        saved_report_id: &str,
    ) -> Result<Vec<ReportExecution>>;
}

pub struct MySqlReportExecutionRepository {
    pool: MySqlPool,
}

impl MySqlReportExecutionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportExecutionRepository for MySqlReportExecutionRepository {
    async fn create(&self, execution: &ReportExecution) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO report_executions (
                id, saved_report_id, tenant_id, status, started_at
            )
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&execution.id)
        .bind(&execution.saved_report_id)
        .bind(&execution.tenant_id)
        .bind(execution.status.to_string())
        .bind(execution.started_at.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn finish(&self, execution: &ReportExecution) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE report_executions
            SET status = ?, completed_at = ?, error_message = ?, output_size = ?
            WHERE id = ? AND status = 'running'
            "#,
        )
        .bind(execution.status.to_string())
        .bind(execution.completed_at.map(|ts| ts.naive_utc()))
        .bind(&execution.error_message)
        .bind(execution.output_size)
        .bind(&execution.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Running execution {}",
                execution.id
            )));
        }
        Ok(())
    }

    async fn list_for_report(
        &self,
        tenant_id: &str,
        saved_report_id: &str,
    ) -> Result<Vec<ReportExecution>> {
        let rows = sqlx::query_as::<_, ExecutionRow>(
            r#"
            SELECT id, saved_report_id, tenant_id, status, started_at,
                   completed_at, error_message, output_size
            FROM report_executions
            WHERE tenant_id = ? AND saved_report_id = ?
            ORDER BY started_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(saved_report_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ReportExecution::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    saved_report_id: String,
    tenant_id: String,
    status: String,
    started_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
    error_message: Option<String>,
    output_size: Option<i64>,
}

impl TryFrom<ExecutionRow> for ReportExecution {
    type Error = AppError;

    fn try_from(row: ExecutionRow) -> Result<Self> {
        let status = match row.status.as_str() {
            "running" => ExecutionStatus::Running,
            "completed" => ExecutionStatus::Completed,
            "failed" => ExecutionStatus::Failed,
            other => {
                return Err(AppError::Internal(format!(
                    "Invalid execution status: {}",
                    other
                )))
            }
        };

        Ok(ReportExecution {
            id: row.id,
            saved_report_id: row.saved_report_id,
            tenant_id: row.tenant_id,
            status,
            started_at: row.started_at.and_utc(),
            completed_at: row.completed_at.map(|ts| ts.and_utc()),
            error_message: row.error_message,
            output_size: row.output_size,
        })
    }
}

#[derive(Default)]
pub struct InMemoryReportExecutionRepository {
    executions: RwLock<Vec<ReportExecution>>,
}

impl InMemoryReportExecutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportExecutionRepository for InMemoryReportExecutionRepository {
    async fn create(&self, execution: &ReportExecution) -> Result<()> {
        self.executions.write().await.push(execution.clone());
        Ok(())
    }

    async fn finish(&self, execution: &ReportExecution) -> Result<()> {
        let mut executions = self.executions.write().await;
        let stored = executions
            .iter_mut()
            .find(|e| e.id == execution.id && e.status == ExecutionStatus::Running)
            .ok_or_else(|| AppError::not_found(format!("Running execution {}", execution.id)))?;
        *stored = execution.clone();
        Ok(())
    }

    async fn list_for_report(
        &self,
        tenant_id: &str,
        saved_report_id: &str,
    ) -> Result<Vec<ReportExecution>> {
        let executions = self.executions.read().await;
        let mut found: Vec<ReportExecution> = executions
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.saved_report_id == saved_report_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(found)
    }
}
