use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::MySqlPool;
use tokio::sync::RwLock;

use crate::core::{AppError, Result};
use crate::modules::reports::models::{CachedReport, ReportType};

/// Persistence for cached report payloads
#[async_trait]
pub trait ReportCacheStore: Send + Sync {
    /// Entry for `(tenant_id, parameters_hash)`, expired or not
    async fn get(&self, tenant_id: &str, parameters_hash: &str) -> Result<Option<CachedReport>>;

    /// Insert or replace the entry with the same `(tenant_id, parameters_hash)`
    async fn upsert(&self, entry: &CachedReport) -> Result<()>;

    /// Delete entries of the given types, for one tenant or for all tenants
    async fn invalidate_report_types(
        &self,
        tenant_id: Option<&str>,
        report_types: &[ReportType],
    ) -> Result<u64>;

    /// Delete every entry that expired before `now`
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

pub struct MySqlReportCacheStore {
    pool: MySqlPool,
}

impl MySqlReportCacheStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportCacheStore for MySqlReportCacheStore {
    async fn get(&self, tenant_id: &str, parameters_hash: &str) -> Result<Option<CachedReport>> {
        let row = sqlx::query_as::<_, CacheRow>(
            r#"
            SELECT tenant_id, store_location_id, report_type, parameters_hash,
                   parameters, data, generated_at, expires_at
            FROM report_cache
            WHERE tenant_id = ? AND parameters_hash = ?
            "#,
        )
        .bind(tenant_id)
        .bind(parameters_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::cache(format!("Failed to read report cache: {}", e)))?;

        row.map(CachedReport::try_from).transpose()
    }

    async fn upsert(&self, entry: &CachedReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO report_cache (
                tenant_id, store_location_id, report_type, parameters_hash,
                parameters, data, generated_at, expires_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                store_location_id = VALUES(store_location_id),
                report_type = VALUES(report_type),
                parameters = VALUES(parameters),
                data = VALUES(data),
                generated_at = VALUES(generated_at),
                expires_at = VALUES(expires_at)
            "#,
        )
        .bind(&entry.tenant_id)
        .bind(&entry.location_id)
        .bind(entry.report_type.as_str())
        .bind(&entry.parameters_hash)
        .bind(Json(&entry.parameters))
        .bind(Json(&entry.data))
        .bind(entry.generated_at.naive_utc())
        .bind(entry.expires_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::cache(format!("Failed to write report cache: {}", e)))?;

        Ok(())
    }

    async fn invalidate_report_types(
        &self,
        tenant_id: Option<&str>,
        report_types: &[ReportType],
    ) -> Result<u64> {
        if report_types.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; report_types.len()].join(", ");
        let sql = format!(
            "DELETE FROM report_cache WHERE report_type IN ({}) AND (? IS NULL OR tenant_id = ?)",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for report_type in report_types {
            query = query.bind(report_type.as_str());
        }
        let result = query
            .bind(tenant_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::cache(format!("Failed to invalidate report cache: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM report_cache WHERE expires_at < ?")
            .bind(now.naive_utc())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::cache(format!("Failed to clean report cache: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// Database row for the report_cache table
#[derive(sqlx::FromRow)]
struct CacheRow {
    tenant_id: String,
    store_location_id: Option<String>,
    report_type: String,
    parameters_hash: String,
    parameters: Json<Value>,
    data: Json<Value>,
    generated_at: NaiveDateTime,
    expires_at: NaiveDateTime,
}

impl TryFrom<CacheRow> for CachedReport {
    type Error = AppError;

    fn try_from(row: CacheRow) -> Result<Self> {
        let report_type = row
            .report_type
            .parse::<ReportType>()
            .map_err(AppError::cache)?;

        Ok(CachedReport {
            tenant_id: row.tenant_id,
            location_id: row.store_location_id,
            report_type,
            parameters_hash: row.parameters_hash,
            parameters: row.parameters.0,
            data: row.data.0,
            generated_at: row.generated_at.and_utc(),
            expires_at: row.expires_at.and_utc(),
        })
    }
}

/// Cache store kept in process memory, keyed like the unique index of the table
#[derive(Default)]
pub struct InMemoryReportCacheStore {
    entries: RwLock<HashMap<(String, String), CachedReport>>,
}

impl InMemoryReportCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ReportCacheStore for InMemoryReportCacheStore {
    async fn get(&self, tenant_id: &str, parameters_hash: &str) -> Result<Option<CachedReport>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(tenant_id.to_string(), parameters_hash.to_string()))
            .cloned())
    }

    async fn upsert(&self, entry: &CachedReport) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            (entry.tenant_id.clone(), entry.parameters_hash.clone()),
            entry.clone(),
        );
        Ok(())
    }

    async fn invalidate_report_types(
        &self,
        tenant_id: Option<&str>,
        report_types: &[ReportType],
    ) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(tenant, _), entry| {
            let tenant_matches = tenant_id.map_or(true, |t| t == tenant);
            !(tenant_matches && report_types.contains(&entry.report_type))
        });
        Ok((before - entries.len()) as u64)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok((before - entries.len()) as u64)
    }
}
