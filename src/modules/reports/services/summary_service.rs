use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::core::currency::{growth_pct, money, percent, share_pct};
use crate::core::timezone::{local_hour, trunc_date_local};
use crate::core::Result;
use crate::modules::reports::models::summary::{
    DailySalesPoint, HourlyPerformance, PaymentShare,
};
use crate::modules::reports::models::{
    PaymentMethod, ReportRequest, ReportType, SummaryReport, TransactionStatus,
};

use super::aggregation::{top_products, total_items, OrderTotals};
use super::context::ReportContext;

const TOP_PRODUCT_LIMIT: usize = 5;

/// Dashboard summary: headline totals, growth, trends and distributions
pub struct SummaryReportService {
    ctx: ReportContext,
}

impl SummaryReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self { ctx }
    }

    pub async fn generate_summary_report(&self, request: &ReportRequest) -> Result<SummaryReport> {
        let parameters = ReportContext::cache_parameters(request, &[]);
        self.ctx
            .cached_or_generate(ReportType::Summary, request, parameters, || {
                self.build(request)
            })
            .await
    }

    async fn build(&self, request: &ReportRequest) -> Result<SummaryReport> {
        let tz = self.ctx.timezone.get_local_timezone(&request.tenant_id).await;
        let scope = request.scope();

        let orders = self.ctx.repo.completed_orders(&scope).await?;
        let previous_orders = self
            .ctx
            .repo
            .completed_orders(&scope.previous_period())
            .await?;
        let lines = self.ctx.repo.order_lines(&scope).await?;
        let transactions = self.ctx.repo.payment_transactions(&scope).await?;

        let totals = OrderTotals::from_orders(&orders);
        let previous = OrderTotals::from_orders(&previous_orders);

        let mut daily: BTreeMap<NaiveDate, (Decimal, i64)> = BTreeMap::new();
        let mut hourly: BTreeMap<u32, (Decimal, i64)> = BTreeMap::new();
        for order in &orders {
            let day = daily
                .entry(trunc_date_local(order.created_at, tz))
                .or_default();
            day.0 += order.collected();
            day.1 += 1;

            let hour = hourly.entry(local_hour(order.created_at, tz)).or_default();
            hour.0 += order.collected();
            hour.1 += 1;
        }

        let mut by_method: BTreeMap<PaymentMethod, (Decimal, i64)> = BTreeMap::new();
        for tx in transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Successful)
        {
            let entry = by_method.entry(tx.method).or_default();
            entry.0 += tx.amount;
            entry.1 += 1;
        }
        let distributed: Decimal = by_method.values().map(|(amount, _)| *amount).sum();
        let mut payment_distribution: Vec<PaymentShare> = by_method
            .into_iter()
            .map(|(method, (amount, count))| PaymentShare {
                method: method.to_string(),
                amount: money(amount),
                count,
                percentage: percent(share_pct(amount, distributed)),
            })
            .collect();
        payment_distribution.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let top_products = top_products(&lines, TOP_PRODUCT_LIMIT);

        info!(
            tenant_id = %request.tenant_id,
            orders = totals.orders,
            "Summary report generated"
        );

        Ok(SummaryReport {
            total_sales: money(totals.revenue),
            total_transactions: totals.orders,
            average_ticket: money(totals.average_order_value()),
            total_tax: money(totals.tax),
            total_discounts: money(totals.discounts),
            total_tips: money(totals.tips),
            total_items: total_items(&lines),
            sales_growth: percent(growth_pct(totals.revenue, previous.revenue)),
            transaction_growth: percent(growth_pct(
                Decimal::from(totals.orders),
                Decimal::from(previous.orders),
            )),
            sales_trend: daily
                .into_iter()
                .map(|(date, (sales, transactions))| DailySalesPoint {
                    date: date.to_string(),
                    sales: money(sales),
                    transactions,
                })
                .collect(),
            payment_distribution,
            hourly_performance: hourly
                .into_iter()
                .map(|(hour, (sales, transactions))| HourlyPerformance {
                    hour,
                    sales: money(sales),
                    transactions,
                })
                .collect(),
            top_product: top_products.first().cloned(),
            top_products,
            order_totals_comparison: totals.comparison(),
            metadata: self.ctx.metadata(request, false).await?,
        })
    }
}
