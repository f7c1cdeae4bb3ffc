use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tillreports::config::Config;
use tillreports::core::TimezoneResolver;
use tillreports::middleware::{error_handler, RequestContext};
use tillreports::modules::exports::services::{
    BulkExportService, ExportQueue, ExportService, ExportWorker,
};
use tillreports::modules::reports::repositories::{
    MySqlReportCacheStore, MySqlReportExecutionRepository, MySqlReportRepository,
    MySqlSavedReportRepository,
};
use tillreports::modules::reports::services::{
    CacheCleanupJob, ReportCacheService, ReportContext, ReportService, SavedReportScheduler,
    SavedReportService,
};
use tillreports::modules::{catalog, exports, health, reports};

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tillreports=debug,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(config.app.json_logs);

    tracing::info!("Starting TillReports reporting service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Business timezone: {}", config.reports.default_timezone);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Reporting services
    let repository = Arc::new(MySqlReportRepository::new(db_pool.clone()));
    let cache = ReportCacheService::new(
        Arc::new(MySqlReportCacheStore::new(db_pool.clone())),
        config.reports.cache_ttl.clone(),
    );
    let timezone = TimezoneResolver::new(repository.clone(), config.reports.default_timezone);
    let report_service = Arc::new(ReportService::new(ReportContext::new(
        repository,
        cache.clone(),
        timezone,
    )));
    let export_service = Arc::new(ExportService::new(report_service.clone()));
    let export_queue = Arc::new(ExportQueue::new());
    let bulk_service = Arc::new(BulkExportService::new(
        export_service.clone(),
        export_queue.clone(),
        &config.reports,
    ));
    let saved_report_service = Arc::new(SavedReportService::new(
        export_service.clone(),
        Arc::new(MySqlSavedReportRepository::new(db_pool.clone())),
        Arc::new(MySqlReportExecutionRepository::new(db_pool.clone())),
    ));

    // Background jobs
    let cleanup_job = Arc::new(CacheCleanupJob::new(cache, config.reports.cleanup_interval()));
    tokio::spawn(cleanup_job.start());

    let export_worker = Arc::new(ExportWorker::new(
        bulk_service.clone(),
        config.reports.bulk_poll_interval(),
    ));
    tokio::spawn(export_worker.start());

    let scheduler = Arc::new(SavedReportScheduler::new(
        saved_report_service.clone(),
        config.reports.saved_report_interval(),
    ));
    tokio::spawn(scheduler.start());

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let reports_config = config.reports.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestContext)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(reports_config.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(export_service.clone()))
            .app_data(web::Data::new(bulk_service.clone()))
            .app_data(web::Data::new(export_queue.clone()))
            .app_data(web::Data::new(saved_report_service.clone()))
            .configure(error_handler::configure)
            .configure(health::controllers::configure)
            .configure(reports::controllers::configure)
            .configure(exports::controllers::configure)
            .configure(catalog::controllers::configure)
            .route("/", web::get().to(index))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "TillReports",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
