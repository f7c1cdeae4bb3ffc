use std::sync::Arc;

use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::core::error::AppError;
use crate::middleware::TenantId;
use crate::modules::reports::services::{CreateSavedReport, SavedReportService};

use super::report_controller::attachment;

pub const EXECUTION_ID_HEADER: &str = "x-execution-id";

/// Store a report definition
/// POST /reports/saved
pub async fn create_saved_report(
    service: web::Data<Arc<SavedReportService>>,
    tenant_id: TenantId,
    body: web::Json<CreateSavedReport>,
) -> Result<HttpResponse, AppError> {
    let saved = service.create(&tenant_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(saved))
}

/// GET /reports/saved
pub async fn list_saved_reports(
    service: web::Data<Arc<SavedReportService>>,
    tenant_id: TenantId,
) -> Result<HttpResponse, AppError> {
    let saved = service.list(&tenant_id.0).await?;
    Ok(HttpResponse::Ok().json(saved))
}

/// Run a saved report now and download the result.
/// A failed run answers 422 with the recorded execution.
/// POST /reports/saved/{id}/run
pub async fn run_saved_report(
    service: web::Data<Arc<SavedReportService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let run = service
        .run_by_id(&tenant_id.0, &path.into_inner(), Utc::now())
        .await?;

    match run.file {
        Some(file) => {
            let mut response = attachment(file.filename, file.content_type, file.bytes);
            if let Ok(value) = HeaderValue::from_str(&run.execution.id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(EXECUTION_ID_HEADER), value);
            }
            Ok(response)
        }
        None => Ok(HttpResponse::UnprocessableEntity().json(run.execution)),
    }
}

/// Past runs of a saved report, newest first
/// GET /reports/saved/{id}/executions
pub async fn list_executions(
    service: web::Data<Arc<SavedReportService>>,
    tenant_id: TenantId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let executions = service.history(&tenant_id.0, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(executions))
}

/// Saved report routes; registered ahead of `/reports/{report_type}`
pub fn routes(scope: actix_web::Scope) -> actix_web::Scope {
    scope
        .route("/saved", web::post().to(create_saved_report))
        .route("/saved", web::get().to(list_saved_reports))
        .route("/saved/{id}/run", web::post().to(run_saved_report))
        .route("/saved/{id}/executions", web::get().to(list_executions))
}
