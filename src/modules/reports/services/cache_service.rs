use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::CacheTtlConfig;
use crate::core::Result;
use crate::modules::reports::models::{CachedReport, ReportType};
use crate::modules::reports::repositories::ReportCacheStore;

/// Tenant-scoped report cache in front of the generators.
///
/// Read and write failures are logged and swallowed: a broken cache degrades to
/// recomputing, it never fails a report request.
#[derive(Clone)]
pub struct ReportCacheService {
    store: Arc<dyn ReportCacheStore>,
    ttl: CacheTtlConfig,
}

impl ReportCacheService {
    pub fn new(store: Arc<dyn ReportCacheStore>, ttl: CacheTtlConfig) -> Self {
        Self { store, ttl }
    }

    /// SHA-256 hex digest of `"{report_type}:{canonical parameters}"`.
    ///
    /// Object keys are sorted at every level, so two parameter sets with the same
    /// pairs in any order map to the same key.
    pub fn generate_cache_key(report_type: ReportType, parameters: &Value) -> String {
        let payload = format!("{}:{}", report_type.as_str(), canonical_json(parameters));
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn ttl_hours(&self, report_type: ReportType) -> u32 {
        self.ttl.hours(report_type)
    }

    /// Cached payload for `key`, if present for this tenant and not yet expired
    pub async fn get_cached(&self, key: &str, tenant_id: &str) -> Option<Value> {
        match self.store.get(tenant_id, key).await {
            Ok(Some(entry)) if !entry.is_expired_at(Utc::now()) => {
                debug!(tenant_id = %tenant_id, report_type = %entry.report_type, "Report cache hit");
                Some(entry.data)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(tenant_id = %tenant_id, error = %e, "Report cache read failed, recomputing");
                None
            }
        }
    }

    /// Upsert a payload under `key` with the TTL of its report type
    pub async fn cache_report(
        &self,
        key: &str,
        data: &Value,
        tenant_id: &str,
        location_id: Option<&str>,
        report_type: ReportType,
        parameters: &Value,
    ) {
        let entry = CachedReport::new(
            tenant_id,
            location_id.map(str::to_string),
            report_type,
            key,
            parameters.clone(),
            data.clone(),
            self.ttl_hours(report_type),
        );

        if let Err(e) = self.store.upsert(&entry).await {
            warn!(
                tenant_id = %tenant_id,
                report_type = %report_type,
                error = %e,
                "Report cache write failed"
            );
        }
    }

    /// Drop every cached report of one type; `None` clears it for all tenants
    pub async fn invalidate_by_report_type(
        &self,
        tenant_id: Option<&str>,
        report_type: ReportType,
    ) -> Result<u64> {
        self.invalidate_report_types(tenant_id, &[report_type]).await
    }

    pub async fn invalidate_report_types(
        &self,
        tenant_id: Option<&str>,
        report_types: &[ReportType],
    ) -> Result<u64> {
        let removed = self
            .store
            .invalidate_report_types(tenant_id, report_types)
            .await?;

        if removed > 0 {
            info!(
                tenant_id = ?tenant_id,
                report_types = ?report_types,
                removed = removed,
                "Report cache invalidated"
            );
        }
        Ok(removed)
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        self.store.cleanup_expired(Utc::now()).await
    }
}

/// Serialise `value` with object keys sorted recursively
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
