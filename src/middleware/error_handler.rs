use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, Error, HttpRequest};

use crate::core::AppError;

/// Malformed query strings surface as validation errors in the standard error body
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    log_rejected(req, &err);
    AppError::validation(format!("Invalid query parameters: {}", err)).into()
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    log_rejected(req, &err);
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    log_rejected(req, &err);
    AppError::validation(format!("Invalid path parameter: {}", err)).into()
}

fn log_rejected(req: &HttpRequest, err: &dyn std::fmt::Display) {
    tracing::warn!(path = %req.path(), error = %err, "Rejected malformed request");
}

/// Extractor configs wired into every app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}
