use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::report_type::ReportType;

/// Persisted report result, unique per `(tenant_id, parameters_hash)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedReport {
    pub tenant_id: String,
    pub location_id: Option<String>,
    pub report_type: ReportType,
    pub parameters_hash: String,
    pub parameters: Value,
    pub data: Value,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedReport {
    pub fn new(
        tenant_id: impl Into<String>,
        location_id: Option<String>,
        report_type: ReportType,
        parameters_hash: impl Into<String>,
        parameters: Value,
        data: Value,
        ttl_hours: u32,
    ) -> Self {
        let generated_at = Utc::now();
        Self {
            tenant_id: tenant_id.into(),
            location_id,
            report_type,
            parameters_hash: parameters_hash.into(),
            parameters,
            data,
            generated_at,
            expires_at: generated_at + Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Expired rows must never be served, only swept
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
