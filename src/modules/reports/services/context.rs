use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::timezone::format_iso8601;
use crate::core::{Result, TimezoneResolver};
use crate::modules::reports::models::{
    DateRange, LocationInfo, ReportMetadata, ReportRequest, ReportType,
};
use crate::modules::reports::repositories::ReportRepository;

use super::cache_service::ReportCacheService;

/// Collaborators shared by every report generator
#[derive(Clone)]
pub struct ReportContext {
    pub repo: Arc<dyn ReportRepository>,
    pub cache: ReportCacheService,
    pub timezone: TimezoneResolver,
}

impl ReportContext {
    pub fn new(
        repo: Arc<dyn ReportRepository>,
        cache: ReportCacheService,
        timezone: TimezoneResolver,
    ) -> Self {
        Self {
            repo,
            cache,
            timezone,
        }
    }

    /// Cache key parameters: the request's dates and location plus generator options
    pub fn cache_parameters(request: &ReportRequest, options: &[(&str, Value)]) -> Value {
        let mut params = request.cache_parameters();
        for (key, value) in options {
            params.insert((*key).to_string(), value.clone());
        }
        Value::Object(params)
    }

    /// Serve from cache when allowed, otherwise run `generate` and cache its result.
    ///
    /// Fresh results are written back even when `use_cache` is false. A cached payload
    /// that no longer deserialises is treated as a miss.
    pub async fn cached_or_generate<T, F, Fut>(
        &self,
        report_type: ReportType,
        request: &ReportRequest,
        parameters: Value,
        generate: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = ReportCacheService::generate_cache_key(report_type, &parameters);

        if request.use_cache {
            if let Some(data) = self.cache.get_cached(&key, &request.tenant_id).await {
                match serde_json::from_value::<T>(data) {
                    Ok(report) => return Ok(report),
                    Err(e) => warn!(
                        tenant_id = %request.tenant_id,
                        report_type = %report_type,
                        error = %e,
                        "Discarding unreadable cached report"
                    ),
                }
            }
        }

        debug!(
            tenant_id = %request.tenant_id,
            report_type = %report_type,
            "Generating report"
        );
        let report = generate().await?;

        let data = serde_json::to_value(&report)?;
        self.cache
            .cache_report(
                &key,
                &data,
                &request.tenant_id,
                request.location_id.as_deref(),
                report_type,
                &parameters,
            )
            .await;

        Ok(report)
    }

    /// Metadata block; resolves the location name when the request is scoped to one
    pub async fn metadata(
        &self,
        request: &ReportRequest,
        is_multi_location: bool,
    ) -> Result<ReportMetadata> {
        let location_name = match &request.location_id {
            Some(location_id) => self
                .repo
                .find_location(&request.tenant_id, location_id)
                .await?
                .map(|l| l.name),
            None => None,
        };

        Ok(ReportMetadata {
            tenant_id: request.tenant_id.clone(),
            generated_at: format_iso8601(Utc::now()),
            date_range: DateRange::from_request(request),
            location_info: LocationInfo {
                location_id: request.location_id.clone(),
                location_name,
                is_multi_location,
            },
        })
    }
}
