use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::modules::catalog::models::{ModifierSelection, ModifierSet, SelectionError};
use crate::modules::catalog::services::validate_for_set;

#[derive(Debug, Deserialize)]
pub struct ValidateSelectionsRequest {
    pub modifier_set: ModifierSet,
    #[serde(default)]
    pub selections: Vec<ModifierSelection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionErrorBody {
    #[serde(flatten)]
    pub error: serde_json::Value,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateSelectionsResponse {
    pub modifier_set_id: String,
    pub valid: bool,
    pub errors: Vec<SelectionErrorBody>,
}

fn error_body(error: &SelectionError) -> Result<SelectionErrorBody, AppError> {
    Ok(SelectionErrorBody {
        error: serde_json::to_value(error)?,
        message: error.to_string(),
    })
}

/// Check an order line's modifier picks against its set.
/// Invalid picks still answer 200; `valid` and `errors` carry the verdict.
/// POST /catalog/modifiers/validate
pub async fn validate_modifiers(
    body: web::Json<ValidateSelectionsRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let outcome = validate_for_set(&request.modifier_set, &request.selections);

    let errors = outcome
        .errors
        .iter()
        .map(error_body)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(ValidateSelectionsResponse {
        modifier_set_id: request.modifier_set.id,
        valid: outcome.is_valid(),
        errors,
    }))
}

/// Configure routes for catalog module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog").route("/modifiers/validate", web::post().to(validate_modifiers)),
    );
}
