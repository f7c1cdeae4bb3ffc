use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::core::currency::{money, safe_div, to_f64};
use crate::core::timezone::{local_hour, trunc_date_local};
use crate::core::Result;
use crate::modules::reports::models::operations::{
    DailyOrderVolume, HourlyPattern, OperationsSummary, StaffPerformance, PEAK_HOUR_LIMIT,
};
use crate::modules::reports::models::{OperationsReport, ReportRequest, ReportType};

use super::aggregation::OrderTotals;
use super::context::ReportContext;

pub const UNASSIGNED_STAFF: &str = "Unassigned";

struct StaffTotals {
    name: String,
    orders: i64,
    revenue: Decimal,
}

/// Store operations: hourly load, daily volume and staff throughput
pub struct OperationsReportService {
    ctx: ReportContext,
}

impl OperationsReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self { ctx }
    }

    pub async fn generate_operations_report(
        &self,
        request: &ReportRequest,
    ) -> Result<OperationsReport> {
        let parameters = ReportContext::cache_parameters(request, &[]);
        self.ctx
            .cached_or_generate(ReportType::Operations, request, parameters, || {
                self.build(request)
            })
            .await
    }

    async fn build(&self, request: &ReportRequest) -> Result<OperationsReport> {
        let tz = self.ctx.timezone.get_local_timezone(&request.tenant_id).await;
        let orders = self.ctx.repo.completed_orders(&request.scope()).await?;
        let totals = OrderTotals::from_orders(&orders);

        let mut hourly: BTreeMap<u32, (i64, Decimal)> = BTreeMap::new();
        let mut daily: BTreeMap<NaiveDate, (i64, Decimal)> = BTreeMap::new();
        let mut staff: HashMap<Option<String>, StaffTotals> = HashMap::new();
        let mut cashiers: HashSet<&str> = HashSet::new();

        for order in &orders {
            let hour = hourly.entry(local_hour(order.created_at, tz)).or_default();
            hour.0 += 1;
            hour.1 += order.collected();

            let day = daily
                .entry(trunc_date_local(order.created_at, tz))
                .or_default();
            day.0 += 1;
            day.1 += order.collected();

            let cashier_id = order.cashier.as_ref().map(|c| c.id.clone());
            if let Some(cashier) = &order.cashier {
                cashiers.insert(cashier.id.as_str());
            }
            let member = staff.entry(cashier_id).or_insert_with(|| StaffTotals {
                name: order
                    .cashier
                    .as_ref()
                    .map(|c| c.display_name())
                    .unwrap_or_else(|| UNASSIGNED_STAFF.to_string()),
                orders: 0,
                revenue: Decimal::ZERO,
            });
            member.orders += 1;
            member.revenue += order.collected();
        }

        let hourly_patterns: Vec<HourlyPattern> = hourly
            .iter()
            .map(|(hour, (orders, revenue))| HourlyPattern {
                hour: *hour,
                orders: *orders,
                revenue: money(*revenue),
                average_order_value: money(safe_div(*revenue, Decimal::from(*orders))),
            })
            .collect();

        let mut peak_hours = hourly_patterns.clone();
        peak_hours.sort_by(|a, b| {
            b.orders
                .cmp(&a.orders)
                .then_with(|| b.revenue.total_cmp(&a.revenue))
                .then_with(|| a.hour.cmp(&b.hour))
        });
        peak_hours.truncate(PEAK_HOUR_LIMIT);

        let daily_volume: Vec<DailyOrderVolume> = daily
            .iter()
            .map(|(date, (orders, revenue))| DailyOrderVolume {
                date: date.to_string(),
                orders: *orders,
                revenue: money(*revenue),
            })
            .collect();

        // Earliest date wins ties in both directions
        let peak_day = daily_volume
            .iter()
            .rev()
            .max_by_key(|d| d.orders)
            .cloned();
        let slowest_day = daily_volume.iter().min_by_key(|d| d.orders).cloned();

        let mut staff_performance: Vec<StaffPerformance> = staff
            .into_iter()
            .map(|(cashier_id, s)| StaffPerformance {
                cashier_id,
                name: s.name,
                orders: s.orders,
                revenue: money(s.revenue),
                average_order_value: money(safe_div(s.revenue, Decimal::from(s.orders))),
            })
            .collect();
        staff_performance.sort_by(|a, b| {
            b.revenue
                .total_cmp(&a.revenue)
                .then_with(|| b.orders.cmp(&a.orders))
                .then_with(|| a.name.cmp(&b.name))
        });

        let days = request.range_days().max(1);

        info!(
            tenant_id = %request.tenant_id,
            orders = totals.orders,
            "Operations report generated"
        );

        Ok(OperationsReport {
            summary: OperationsSummary {
                total_orders: totals.orders,
                total_revenue: money(totals.revenue),
                average_order_value: money(totals.average_order_value()),
                busiest_hour: peak_hours.first().map(|h| h.hour),
                active_staff: cashiers.len() as i64,
                average_daily_orders: to_f64(
                    safe_div(Decimal::from(totals.orders), Decimal::from(days)).round_dp(2),
                ),
            },
            hourly_patterns,
            peak_hours,
            daily_volume,
            peak_day,
            slowest_day,
            staff_performance,
            metadata: self.ctx.metadata(request, false).await?,
        })
    }
}
