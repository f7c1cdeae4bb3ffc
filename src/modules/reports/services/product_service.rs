use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::core::currency::{money, percent, safe_div, share_pct};
use crate::core::timezone::{trunc_date_local, truncate_to_period};
use crate::core::Result;
use crate::modules::reports::models::products::{
    CategoryPerformance, ProductPerformance, ProductTrend, ProductsSummary, TrendPoint,
    DEFAULT_PRODUCT_LIMIT, TREND_PRODUCT_LIMIT,
};
use crate::modules::reports::models::{ProductsReport, ReportRequest, ReportType, TrendPeriod};

use super::aggregation::{
    category_totals, product_totals, sort_by_quantity, sort_by_revenue, ProductTotals,
};
use super::context::ReportContext;

/// Options of the products report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductReportOptions {
    pub limit: usize,
    /// Overrides the range-based trend granularity
    pub trend_period: Option<TrendPeriod>,
}

impl Default for ProductReportOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PRODUCT_LIMIT,
            trend_period: None,
        }
    }
}

/// Product and category performance with per-product trends
pub struct ProductReportService {
    ctx: ReportContext,
}

impl ProductReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self { ctx }
    }

    pub async fn generate_products_report(
        &self,
        request: &ReportRequest,
        options: ProductReportOptions,
    ) -> Result<ProductsReport> {
        let limit = options.limit.max(1);
        let trend_period = options
            .trend_period
            .unwrap_or_else(|| TrendPeriod::for_range_days(request.range_days()));

        let parameters = ReportContext::cache_parameters(
            request,
            &[
                ("limit", Value::from(limit)),
                ("trend_period", Value::String(trend_period.as_str().to_string())),
            ],
        );
        self.ctx
            .cached_or_generate(ReportType::Products, request, parameters, || {
                self.build(request, limit, trend_period)
            })
            .await
    }

    async fn build(
        &self,
        request: &ReportRequest,
        limit: usize,
        trend_period: TrendPeriod,
    ) -> Result<ProductsReport> {
        let tz = self.ctx.timezone.get_local_timezone(&request.tenant_id).await;
        let lines = self.ctx.repo.order_lines(&request.scope()).await?;

        let mut products = product_totals(&lines);
        let total_revenue: Decimal = products.iter().map(|p| p.revenue).sum();
        let total_quantity: i64 = products.iter().map(|p| p.quantity).sum();
        let categories = category_totals(&lines);

        let performance = |p: &ProductTotals| ProductPerformance {
            product_id: p.product_id.clone(),
            name: p.name.clone(),
            category: p.category.clone(),
            quantity: p.quantity,
            revenue: money(p.revenue),
            order_count: p.order_ids.len() as i64,
            average_price: money(safe_div(p.revenue, Decimal::from(p.quantity))),
            revenue_share: percent(share_pct(p.revenue, total_revenue)),
        };

        sort_by_quantity(&mut products);
        let top_by_quantity: Vec<ProductPerformance> =
            products.iter().take(limit).map(performance).collect();

        sort_by_revenue(&mut products);
        let top_by_revenue: Vec<ProductPerformance> =
            products.iter().take(limit).map(performance).collect();

        let trend_ids: HashSet<&str> = products
            .iter()
            .take(TREND_PRODUCT_LIMIT)
            .map(|p| p.product_id.as_str())
            .collect();
        let mut series: BTreeMap<&str, BTreeMap<NaiveDate, (i64, Decimal)>> = BTreeMap::new();
        for line in lines.iter().filter(|l| trend_ids.contains(l.product_id.as_str())) {
            let period =
                truncate_to_period(trunc_date_local(line.order_created_at, tz), trend_period);
            let point = series
                .entry(line.product_id.as_str())
                .or_default()
                .entry(period)
                .or_default();
            point.0 += line.quantity;
            point.1 += line.revenue();
        }
        let product_trends = products
            .iter()
            .take(TREND_PRODUCT_LIMIT)
            .map(|p| ProductTrend {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                data: series
                    .remove(p.product_id.as_str())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(period, (quantity, revenue))| TrendPoint {
                        period: period.to_string(),
                        quantity,
                        revenue: money(revenue),
                    })
                    .collect(),
            })
            .collect();

        let mut category_performance: Vec<CategoryPerformance> = categories
            .iter()
            .map(|(category, c)| CategoryPerformance {
                category: category.clone(),
                revenue: money(c.revenue),
                quantity: c.quantity,
                product_count: c.products.len() as i64,
                percentage: percent(share_pct(c.revenue, total_revenue)),
            })
            .collect();
        category_performance.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

        info!(
            tenant_id = %request.tenant_id,
            products = products.len(),
            trend_period = %trend_period,
            "Products report generated"
        );

        Ok(ProductsReport {
            limit,
            summary: ProductsSummary {
                products_sold: products.len() as i64,
                total_quantity,
                total_revenue: money(total_revenue),
                average_price: money(safe_div(total_revenue, Decimal::from(total_quantity))),
                category_count: categories.len() as i64,
            },
            top_by_revenue,
            top_by_quantity,
            category_performance,
            trend_period,
            product_trends,
            metadata: self.ctx.metadata(request, false).await?,
        })
    }
}
