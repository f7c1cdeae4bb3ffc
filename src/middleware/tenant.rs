use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::core::AppError;

pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Tenant the request acts for.
///
/// Resolved by the upstream gateway; taken from request extensions when a middleware
/// has already set it, otherwise from the `X-Tenant-ID` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(pub String);

impl FromRequest for TenantId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(tenant) = req.extensions().get::<TenantId>() {
            return ready(Ok(tenant.clone()));
        }

        let tenant = req
            .headers()
            .get(TENANT_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| TenantId(s.to_string()))
            .ok_or_else(|| AppError::validation(format!("Missing {} header", TENANT_HEADER)));

        ready(tenant)
    }
}
