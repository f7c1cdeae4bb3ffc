use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::modules::exports::services::ExportQueue;

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub database: bool,
    /// Bulk exports waiting for the worker
    pub pending_exports: usize,
}

/// GET /health - Liveness check, no dependencies touched
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /ready - Readiness check: database reachable, export queue depth
pub async fn readiness_check(
    pool: Option<web::Data<MySqlPool>>,
    queue: Option<web::Data<Arc<ExportQueue>>>,
) -> impl Responder {
    let database = match pool {
        Some(pool) => match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database readiness check failed");
                false
            }
        },
        None => false,
    };
    let pending_exports = match queue {
        Some(queue) => queue.pending().await,
        None => 0,
    };

    let response = ReadinessResponse {
        ready: database,
        checks: ReadinessChecks {
            database,
            pending_exports,
        },
    };

    if response.ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
