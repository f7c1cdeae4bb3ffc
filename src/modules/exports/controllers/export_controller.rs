use std::sync::Arc;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::middleware::TenantId;
use crate::modules::exports::models::BulkExportRequest;
use crate::modules::exports::services::BulkExportService;
use crate::modules::reports::controllers::attachment;

/// Queue a bulk export
/// POST /exports/bulk
pub async fn create_bulk_export(
    service: web::Data<Arc<BulkExportService>>,
    tenant_id: TenantId,
    request: web::Json<BulkExportRequest>,
) -> Result<HttpResponse, AppError> {
    let operation = service.submit(&tenant_id.0, request.into_inner()).await?;

    Ok(HttpResponse::Accepted().json(operation))
}

/// Poll a bulk export
/// GET /exports/bulk/{id}
pub async fn get_bulk_export(
    service: web::Data<Arc<BulkExportService>>,
    tenant_id: TenantId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let operation = service.status(&tenant_id.0, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(operation))
}

/// Download a finished bulk export
/// GET /exports/bulk/{id}/download
pub async fn download_bulk_export(
    service: web::Data<Arc<BulkExportService>>,
    tenant_id: TenantId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let file = service.download(&tenant_id.0, path.into_inner()).await?;

    Ok(attachment(file.filename, file.content_type, file.bytes))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/exports")
            .route("/bulk", web::post().to(create_bulk_export))
            .route("/bulk/{id}", web::get().to(get_bulk_export))
            .route("/bulk/{id}/download", web::get().to(download_bulk_export)),
    );
}
