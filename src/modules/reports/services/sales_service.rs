use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::core::currency::{growth_pct, money, percent, share_pct};
use crate::core::timezone::{format_iso8601, local_hour, trunc_date_local, truncate_to_period};
use crate::core::Result;
use crate::modules::reports::models::sales::{
    CategorySales, HourlyRevenue, MethodDrilldown, PaymentReconciliation, SalesPeriod,
    SalesSummary, TransactionDetail,
};
use crate::modules::reports::models::{
    PaymentMethod, ReportRequest, ReportType, SalesReport, TransactionFact, TransactionStatus,
    TrendPeriod,
};

use super::aggregation::{category_totals, total_items, OrderTotals};
use super::context::ReportContext;

const TOP_HOURS_LIMIT: usize = 10;

#[derive(Default)]
struct Bucket<'a> {
    revenue: Decimal,
    orders: i64,
    items: i64,
    methods: BTreeMap<PaymentMethod, Vec<&'a TransactionFact>>,
}

/// Period-bucketed sales with per-method drill-down and payment reconciliation
pub struct SalesReportService {
    ctx: ReportContext,
}

impl SalesReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self { ctx }
    }

    pub async fn generate_sales_report(
        &self,
        request: &ReportRequest,
        group_by: TrendPeriod,
    ) -> Result<SalesReport> {
        let parameters = ReportContext::cache_parameters(
            request,
            &[("group_by", Value::String(group_by.as_str().to_string()))],
        );
        self.ctx
            .cached_or_generate(ReportType::Sales, request, parameters, || {
                self.build(request, group_by)
            })
            .await
    }

    async fn build(&self, request: &ReportRequest, group_by: TrendPeriod) -> Result<SalesReport> {
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
        let status_counts = self.ctx.repo.order_status_counts(&scope).await?;

        let totals = OrderTotals::from_orders(&orders);
        let previous = OrderTotals::from_orders(&previous_orders);

        // Everything belonging to an order lands in the order's bucket
        let mut order_period: HashMap<&str, NaiveDate> = HashMap::new();
        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        let mut hourly: BTreeMap<u32, (Decimal, i64)> = BTreeMap::new();
        for order in &orders {
            let period = truncate_to_period(trunc_date_local(order.created_at, tz), group_by);
            order_period.insert(order.order_id.as_str(), period);

            let bucket = buckets.entry(period).or_default();
            bucket.revenue += order.collected();
            bucket.orders += 1;

            let hour = hourly.entry(local_hour(order.created_at, tz)).or_default();
            hour.0 += order.collected();
            hour.1 += 1;
        }

        for line in &lines {
            if let Some(period) = order_period.get(line.order_id.as_str()) {
                buckets.entry(*period).or_default().items += line.quantity;
            }
        }

        let successful: Vec<&TransactionFact> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Successful)
            .collect();
        for tx in &successful {
            if let Some(period) = order_period.get(tx.order_id.as_str()) {
                buckets
                    .entry(*period)
                    .or_default()
                    .methods
                    .entry(tx.method)
                    .or_default()
                    .push(tx);
            }
        }

        let sales_data = buckets
            .into_iter()
            .map(|(period, bucket)| SalesPeriod {
                period: period.to_string(),
                revenue: money(bucket.revenue),
                orders: bucket.orders,
                items: bucket.items,
                payment_methods: bucket
                    .methods
                    .into_iter()
                    .map(|(method, mut txs)| {
                        txs.sort_by_key(|t| t.created_at);
                        let amount: Decimal = txs.iter().map(|t| t.amount).sum();
                        MethodDrilldown {
                            method: method.to_string(),
                            amount: money(amount),
                            count: txs.len() as i64,
                            transactions: txs.into_iter().map(transaction_detail).collect(),
                        }
                    })
                    .collect(),
            })
            .collect();

        let categories = category_totals(&lines);
        let line_revenue: Decimal = categories.values().map(|c| c.revenue).sum();
        let mut category_breakdown: Vec<CategorySales> = categories
            .into_iter()
            .map(|(category, c)| CategorySales {
                category,
                revenue: money(c.revenue),
                quantity: c.quantity,
                percentage: percent(share_pct(c.revenue, line_revenue)),
            })
            .collect();
        category_breakdown.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

        let mut hours: Vec<(u32, Decimal, i64)> = hourly
            .into_iter()
            .map(|(hour, (revenue, orders))| (hour, revenue, orders))
            .collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let top_hours = hours
            .into_iter()
            .take(TOP_HOURS_LIMIT)
            .map(|(hour, revenue, orders)| HourlyRevenue {
                hour,
                revenue: money(revenue),
                orders,
            })
            .collect();

        let total_transactions = transactions.len() as i64;
        let successful_transactions = successful.len() as i64;
        let payment_reconciliation = PaymentReconciliation {
            total_orders: status_counts.total,
            completed_orders: status_counts.completed,
            order_completion_rate: percent(share_pct(
                Decimal::from(status_counts.completed),
                Decimal::from(status_counts.total),
            )),
            orders_with_payment: totals.orders_with_payment,
            payment_success_rate: percent(share_pct(
                Decimal::from(totals.orders_with_payment),
                Decimal::from(totals.orders),
            )),
            total_transactions,
            successful_transactions,
            transaction_success_rate: percent(share_pct(
                Decimal::from(successful_transactions),
                Decimal::from(total_transactions),
            )),
            order_totals_comparison: totals.comparison(),
        };

        info!(
            tenant_id = %request.tenant_id,
            group_by = %group_by,
            orders = totals.orders,
            "Sales report generated"
        );

        Ok(SalesReport {
            group_by,
            summary: SalesSummary {
                total_revenue: money(totals.revenue),
                total_orders: totals.orders,
                total_items: total_items(&lines),
                average_order_value: money(totals.average_order_value()),
                total_tax: money(totals.tax),
                total_discounts: money(totals.discounts),
                total_tips: money(totals.tips),
                revenue_growth: percent(growth_pct(totals.revenue, previous.revenue)),
                order_growth: percent(growth_pct(
                    Decimal::from(totals.orders),
                    Decimal::from(previous.orders),
                )),
            },
            sales_data,
            category_breakdown,
            top_hours,
            payment_reconciliation,
            metadata: self.ctx.metadata(request, false).await?,
        })
    }
}

fn transaction_detail(tx: &TransactionFact) -> TransactionDetail {
    TransactionDetail {
        transaction_id: tx.transaction_id.clone(),
        order_id: tx.order_id.clone(),
        order_number: tx.order_number.clone(),
        amount: money(tx.amount),
        tip: money(tx.tip),
        surcharge: money(tx.surcharge),
        time: format_iso8601(tx.created_at),
    }
}
