use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::core::Result;
use crate::modules::reports::models::{ReportRequest, ReportType, TrendPeriod};

use super::cache_service::ReportCacheService;
use super::context::ReportContext;
use super::operations_service::OperationsReportService;
use super::payment_service::PaymentReportService;
use super::product_service::{ProductReportOptions, ProductReportService};
use super::sales_service::SalesReportService;
use super::summary_service::SummaryReportService;

/// Type-specific generator options, all optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Sales bucket size
    pub group_by: Option<TrendPeriod>,
    /// Products top-N
    pub limit: Option<usize>,
    /// Products trend granularity override
    pub trend_period: Option<TrendPeriod>,
}

/// Entry point used by HTTP handlers, exports and saved reports
pub struct ReportService {
    ctx: ReportContext,
    summary: SummaryReportService,
    sales: SalesReportService,
    products: ProductReportService,
    payments: PaymentReportService,
    operations: OperationsReportService,
}

impl ReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self {
            summary: SummaryReportService::new(ctx.clone()),
            sales: SalesReportService::new(ctx.clone()),
            products: ProductReportService::new(ctx.clone()),
            payments: PaymentReportService::new(ctx.clone()),
            operations: OperationsReportService::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &ReportContext {
        &self.ctx
    }

    pub fn cache(&self) -> &ReportCacheService {
        &self.ctx.cache
    }

    pub fn summary(&self) -> &SummaryReportService {
        &self.summary
    }

    pub fn sales(&self) -> &SalesReportService {
        &self.sales
    }

    pub fn products(&self) -> &ProductReportService {
        &self.products
    }

    pub fn payments(&self) -> &PaymentReportService {
        &self.payments
    }

    pub fn operations(&self) -> &OperationsReportService {
        &self.operations
    }

    /// Generate any report type as its JSON payload
    pub async fn generate(
        &self,
        report_type: ReportType,
        request: &ReportRequest,
        options: &ReportOptions,
    ) -> Result<Value> {
        info!(
            tenant_id = %request.tenant_id,
            report_type = %report_type,
            use_cache = request.use_cache,
            "Report requested"
        );

        let payload = match report_type {
            ReportType::Summary => {
                serde_json::to_value(self.summary.generate_summary_report(request).await?)?
            }
            ReportType::Sales => serde_json::to_value(
                self.sales
                    .generate_sales_report(request, options.group_by.unwrap_or_default())
                    .await?,
            )?,
            ReportType::Products => {
                let mut product_options = ProductReportOptions {
                    trend_period: options.trend_period,
                    ..ProductReportOptions::default()
                };
                if let Some(limit) = options.limit {
                    product_options.limit = limit;
                }
                serde_json::to_value(
                    self.products
                        .generate_products_report(request, product_options)
                        .await?,
                )?
            }
            ReportType::Payments => {
                serde_json::to_value(self.payments.generate_payments_report(request).await?)?
            }
            ReportType::Operations => serde_json::to_value(
                self.operations.generate_operations_report(request).await?,
            )?,
        };

        Ok(payload)
    }
}
