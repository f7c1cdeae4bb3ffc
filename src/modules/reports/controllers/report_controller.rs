use std::sync::Arc;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::ReportsConfig;
use crate::core::error::AppError;
use crate::core::timezone::parse_boundary;
use crate::middleware::TenantId;
use crate::modules::exports::services::ExportService;
use crate::modules::reports::models::{ExportFormat, ReportRequest, ReportType, TrendPeriod};
use crate::modules::reports::services::{CacheInvalidator, EntityKind, ReportOptions, ReportService};

/// Query parameters shared by report and export endpoints
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// `YYYY-MM-DD` or RFC 3339; a bare end date includes that whole day
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    #[serde(default)]
    pub group_by: Option<TrendPeriod>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub trend_period: Option<TrendPeriod>,
    /// Export endpoint only
    #[serde(default)]
    pub format: Option<String>,
}

fn default_use_cache() -> bool {
    true
}

impl ReportQuery {
    /// Build the request; bare dates are read in the tenant's timezone `tz`
    pub fn to_request(
        &self,
        tenant_id: &str,
        max_range_days: i64,
        tz: Tz,
    ) -> Result<ReportRequest, AppError> {
        let start = parse_boundary(&self.start_date, false, tz).map_err(AppError::validation)?;
        let end = parse_boundary(&self.end_date, true, tz).map_err(AppError::validation)?;

        if start >= end {
            return Err(AppError::validation("start_date must be before end_date"));
        }

        let request = ReportRequest::new(tenant_id, start, end)
            .with_location(self.location_id.clone().filter(|l| !l.trim().is_empty()))
            .with_cache(self.use_cache);
        if request.range_days() > max_range_days {
            return Err(AppError::validation(format!(
                "Date range cannot exceed {} days",
                max_range_days
            )));
        }
        Ok(request)
    }

    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            group_by: self.group_by,
            limit: self.limit,
            trend_period: self.trend_period,
        }
    }

    pub fn export_format(&self) -> Result<ExportFormat, AppError> {
        match &self.format {
            Some(format) => format.parse().map_err(AppError::validation),
            None => Ok(ExportFormat::Csv),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub report_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntityChangedRequest {
    pub entity: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidationResponse {
    pub invalidated: u64,
    pub report_types: Vec<ReportType>,
}

fn parse_report_type(raw: &str) -> Result<ReportType, AppError> {
    raw.parse().map_err(AppError::validation)
}

/// Generate a report as JSON
/// GET /reports/{report_type}
pub async fn get_report(
    service: web::Data<Arc<ReportService>>,
    config: web::Data<ReportsConfig>,
    tenant_id: TenantId,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let report_type = parse_report_type(&path.into_inner())?;
    let tz = service.context().timezone.get_local_timezone(&tenant_id.0).await;
    let request = query.to_request(&tenant_id.0, config.max_range_days, tz)?;

    let report = service
        .generate(report_type, &request, &query.options())
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Download a report as CSV, XLSX or PDF
/// GET /reports/{report_type}/export
pub async fn export_report(
    service: web::Data<Arc<ExportService>>,
    config: web::Data<ReportsConfig>,
    tenant_id: TenantId,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let report_type = parse_report_type(&path.into_inner())?;
    let format = query.export_format()?;
    let tz = service
        .reports()
        .context()
        .timezone
        .get_local_timezone(&tenant_id.0)
        .await;
    let request = query.to_request(&tenant_id.0, config.max_range_days, tz)?;

    let file = service
        .export(report_type, &request, &query.options(), format)
        .await?;

    Ok(attachment(file.filename, file.content_type, file.bytes))
}

/// Build a download response
pub fn attachment(filename: String, content_type: String, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes)
}

/// Drop the tenant's cached reports, optionally of one type only
/// DELETE /reports/cache
pub async fn invalidate_cache(
    service: web::Data<Arc<ReportService>>,
    tenant_id: TenantId,
    query: web::Query<InvalidateQuery>,
) -> Result<HttpResponse, AppError> {
    let report_types = match &query.report_type {
        Some(raw) => vec![parse_report_type(raw)?],
        None => ReportType::ALL.to_vec(),
    };

    let invalidated = service
        .cache()
        .invalidate_report_types(Some(&tenant_id.0), &report_types)
        .await?;

    Ok(HttpResponse::Ok().json(InvalidationResponse {
        invalidated,
        report_types,
    }))
}

/// Notification that a transactional entity changed
/// POST /reports/cache/events
pub async fn entity_changed(
    service: web::Data<Arc<ReportService>>,
    tenant_id: TenantId,
    body: web::Json<EntityChangedRequest>,
) -> Result<HttpResponse, AppError> {
    let entity: EntityKind = body.entity.parse().map_err(AppError::validation)?;
    let invalidator = CacheInvalidator::new(service.cache().clone());
    let invalidated = invalidator.on_entity_changed(&tenant_id.0, entity).await;

    Ok(HttpResponse::Ok().json(InvalidationResponse {
        invalidated,
        report_types: entity.affected_reports().to_vec(),
    }))
}

/// Configure routes for reports module
pub fn configure(cfg: &mut web::ServiceConfig) {
    let scope = web::scope("/reports")
        .route("/cache", web::delete().to(invalidate_cache))
        .route("/cache/events", web::post().to(entity_changed));
    cfg.service(
        super::saved_report_controller::routes(scope)
            .route("/{report_type}", web::get().to(get_report))
            .route("/{report_type}/export", web::get().to(export_report)),
    );
}
