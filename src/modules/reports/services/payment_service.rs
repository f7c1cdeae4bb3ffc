use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::currency::{from_money, money, percent, safe_div, share_pct};
use crate::core::timezone::trunc_date_local;
use crate::core::Result;
use crate::modules::reports::models::payments::{
    DailyMethodBreakdown, DailyVolume, LocationPaymentSummary, MethodAmount,
    PaymentMethodBreakdown, PaymentsSummary,
};
use crate::modules::reports::models::{
    LocationInfo, PaymentMethod, PaymentsReport, ReportMetadata, ReportRequest, ReportType,
    StoreLocation, TransactionStatus,
};

use super::aggregation::{order_totals_comparison, OrderTotals};
use super::context::ReportContext;

#[derive(Default)]
struct MethodTotals {
    amount: Decimal,
    count: i64,
    fees: Decimal,
    refunded: Decimal,
    refund_count: i64,
}

/// Tender-level payment analysis, consolidated across locations when unscoped
pub struct PaymentReportService {
    ctx: ReportContext,
}

impl PaymentReportService {
    pub fn new(ctx: ReportContext) -> Self {
        Self { ctx }
    }

    /// Single-location report when a location is given or the tenant has at most one
    /// active location; otherwise one report per active location, consolidated.
    pub async fn generate_payments_report(&self, request: &ReportRequest) -> Result<PaymentsReport> {
        let parameters = ReportContext::cache_parameters(request, &[]);
        self.ctx
            .cached_or_generate(ReportType::Payments, request, parameters, || async {
                if request.location_id.is_none() {
                    let locations = self.ctx.repo.active_locations(&request.tenant_id).await?;
                    if locations.len() > 1 {
                        return self.build_multi_location(request, locations).await;
                    }
                }
                self.build_single(request).await
            })
            .await
    }

    async fn build_multi_location(
        &self,
        request: &ReportRequest,
        locations: Vec<StoreLocation>,
    ) -> Result<PaymentsReport> {
        info!(
            tenant_id = %request.tenant_id,
            locations = locations.len(),
            "Generating multi-location payments report"
        );

        let mut reports = Vec::with_capacity(locations.len());
        for location in locations {
            let scoped = request.clone().with_location(Some(location.id.clone()));
            let parameters = ReportContext::cache_parameters(&scoped, &[]);
            let report = self
                .ctx
                .cached_or_generate(ReportType::Payments, &scoped, parameters, || {
                    self.build_single(&scoped)
                })
                .await?;
            reports.push(report);
        }

        let mut consolidated = consolidate_payment_reports(&reports);
        consolidated.metadata = self.ctx.metadata(request, true).await?;
        Ok(consolidated)
    }

    async fn build_single(&self, request: &ReportRequest) -> Result<PaymentsReport> {
        let tz = self.ctx.timezone.get_local_timezone(&request.tenant_id).await;
        let scope = request.scope();

        let orders = self.ctx.repo.completed_orders(&scope).await?;
        let transactions = self.ctx.repo.payment_transactions(&scope).await?;
        let totals = OrderTotals::from_orders(&orders);

        let mut summary = PaymentsSummary {
            total_revenue: money(totals.revenue),
            total_transactions: transactions.len() as i64,
            ..PaymentsSummary::default()
        };

        let mut processed = Decimal::ZERO;
        let mut tips = Decimal::ZERO;
        let mut surcharges = Decimal::ZERO;
        let mut fees = Decimal::ZERO;
        let mut refunded = Decimal::ZERO;
        let mut by_method: BTreeMap<PaymentMethod, MethodTotals> = BTreeMap::new();
        let mut daily: BTreeMap<NaiveDate, BTreeMap<PaymentMethod, (Decimal, i64)>> =
            BTreeMap::new();

        for tx in &transactions {
            match tx.status {
                TransactionStatus::Successful => summary.successful_transactions += 1,
                TransactionStatus::Failed => summary.failed_transactions += 1,
                TransactionStatus::Refunded | TransactionStatus::PartiallyRefunded => {
                    summary.refunded_transactions += 1
                }
                TransactionStatus::Canceled => summary.canceled_transactions += 1,
                TransactionStatus::Pending => {}
            }

            if !tx.status.is_processed() {
                continue;
            }

            let fee = tx.amount * tx.method.processing_fee_rate();
            processed += tx.amount;
            tips += tx.tip;
            surcharges += tx.surcharge;
            fees += fee;
            refunded += tx.refunded_amount;

            let method = by_method.entry(tx.method).or_default();
            method.amount += tx.amount;
            method.count += 1;
            method.fees += fee;
            method.refunded += tx.refunded_amount;
            if tx.status.is_refund() {
                method.refund_count += 1;
            }

            let day = daily
                .entry(trunc_date_local(tx.created_at, tz))
                .or_default()
                .entry(tx.method)
                .or_default();
            day.0 += tx.amount;
            day.1 += 1;
        }

        summary.success_rate = percent(share_pct(
            Decimal::from(summary.successful_transactions),
            Decimal::from(summary.total_transactions),
        ));
        summary.total_processed = money(processed);
        summary.total_tips = money(tips);
        summary.total_surcharges = money(surcharges);
        summary.total_processing_fees = money(fees);
        summary.total_refunded = money(refunded);
        summary.net_revenue = money(processed - refunded - fees);

        let mut payment_methods: Vec<PaymentMethodBreakdown> = by_method
            .into_iter()
            .map(|(method, t)| PaymentMethodBreakdown {
                method: method.to_string(),
                amount: money(t.amount),
                count: t.count,
                average_amount: money(safe_div(t.amount, Decimal::from(t.count))),
                processing_fees: money(t.fees),
                refunded_amount: money(t.refunded),
                refund_count: t.refund_count,
                net_amount: money(t.amount - t.refunded - t.fees),
                percentage: percent(share_pct(t.amount, processed)),
            })
            .collect();
        payment_methods.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let (daily_volume, daily_breakdown) = daily_series(daily);

        Ok(PaymentsReport {
            summary,
            payment_methods,
            daily_volume,
            daily_breakdown,
            order_totals_comparison: totals.comparison(),
            location_breakdown: Vec::new(),
            metadata: self.ctx.metadata(request, false).await?,
        })
    }
}

fn daily_series(
    daily: BTreeMap<NaiveDate, BTreeMap<PaymentMethod, (Decimal, i64)>>,
) -> (Vec<DailyVolume>, Vec<DailyMethodBreakdown>) {
    let mut volume = Vec::with_capacity(daily.len());
    let mut breakdown = Vec::with_capacity(daily.len());
    for (date, methods) in daily {
        let amount: Decimal = methods.values().map(|(a, _)| *a).sum();
        let count: i64 = methods.values().map(|(_, c)| *c).sum();
        volume.push(DailyVolume {
            date: date.to_string(),
            amount: money(amount),
            count,
        });
        breakdown.push(DailyMethodBreakdown {
            date: date.to_string(),
            methods: methods
                .into_iter()
                .map(|(method, (amount, count))| MethodAmount {
                    method: method.to_string(),
                    amount: money(amount),
                    count,
                })
                .collect(),
        });
    }
    (volume, breakdown)
}

/// Re-aggregate already generated payments reports into one.
///
/// Sums are added up; every ratio (success rate, averages, shares) is recomputed from
/// the consolidated totals, never averaged. Consolidating consolidated reports gives the
/// same figures as consolidating their inputs directly.
pub fn consolidate_payment_reports(reports: &[PaymentsReport]) -> PaymentsReport {
    let mut total_revenue = Decimal::ZERO;
    let mut processed = Decimal::ZERO;
    let mut tips = Decimal::ZERO;
    let mut surcharges = Decimal::ZERO;
    let mut fees = Decimal::ZERO;
    let mut refunded = Decimal::ZERO;
    let mut collected = Decimal::ZERO;
    let mut grand_total = Decimal::ZERO;
    let mut summary = PaymentsSummary::default();
    let mut by_method: BTreeMap<String, MethodTotals> = BTreeMap::new();
    let mut daily: BTreeMap<String, BTreeMap<String, (Decimal, i64)>> = BTreeMap::new();
    let mut location_breakdown = Vec::new();

    for report in reports {
        let s = &report.summary;
        total_revenue += from_money(s.total_revenue);
        processed += from_money(s.total_processed);
        tips += from_money(s.total_tips);
        surcharges += from_money(s.total_surcharges);
        fees += from_money(s.total_processing_fees);
        refunded += from_money(s.total_refunded);
        summary.total_transactions += s.total_transactions;
        summary.successful_transactions += s.successful_transactions;
        summary.failed_transactions += s.failed_transactions;
        summary.refunded_transactions += s.refunded_transactions;
        summary.canceled_transactions += s.canceled_transactions;

        collected += from_money(report.order_totals_comparison.payment_total_collected);
        grand_total += from_money(report.order_totals_comparison.order_grand_total);

        for m in &report.payment_methods {
            let method = by_method.entry(m.method.clone()).or_default();
            method.amount += from_money(m.amount);
            method.count += m.count;
            method.fees += from_money(m.processing_fees);
            method.refunded += from_money(m.refunded_amount);
            method.refund_count += m.refund_count;
        }

        for day in &report.daily_breakdown {
            let entry = daily.entry(day.date.clone()).or_default();
            for m in &day.methods {
                let amount = entry.entry(m.method.clone()).or_default();
                amount.0 += from_money(m.amount);
                amount.1 += m.count;
            }
        }

        if report.location_breakdown.is_empty() {
            match &report.metadata.location_info.location_id {
                Some(location_id) => location_breakdown.push(LocationPaymentSummary {
                    location_id: location_id.clone(),
                    location_name: report
                        .metadata
                        .location_info
                        .location_name
                        .clone()
                        .unwrap_or_else(|| location_id.clone()),
                    total_revenue: s.total_revenue,
                    total_processed: s.total_processed,
                    total_transactions: s.total_transactions,
                    success_rate: s.success_rate,
                }),
                None => warn!("Consolidating a payments report without location metadata"),
            }
        } else {
            location_breakdown.extend(report.location_breakdown.iter().cloned());
        }
    }

    summary.total_revenue = money(total_revenue);
    summary.success_rate = percent(share_pct(
        Decimal::from(summary.successful_transactions),
        Decimal::from(summary.total_transactions),
    ));
    summary.total_processed = money(processed);
    summary.total_tips = money(tips);
    summary.total_surcharges = money(surcharges);
    summary.total_processing_fees = money(fees);
    summary.total_refunded = money(refunded);
    summary.net_revenue = money(processed - refunded - fees);

    let mut payment_methods: Vec<PaymentMethodBreakdown> = by_method
        .into_iter()
        .map(|(method, t)| PaymentMethodBreakdown {
            method,
            amount: money(t.amount),
            count: t.count,
            average_amount: money(safe_div(t.amount, Decimal::from(t.count))),
            processing_fees: money(t.fees),
            refunded_amount: money(t.refunded),
            refund_count: t.refund_count,
            net_amount: money(t.amount - t.refunded - t.fees),
            percentage: percent(share_pct(t.amount, processed)),
        })
        .collect();
    payment_methods.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let mut daily_volume = Vec::with_capacity(daily.len());
    let mut daily_breakdown = Vec::with_capacity(daily.len());
    for (date, methods) in daily {
        daily_volume.push(DailyVolume {
            date: date.clone(),
            amount: money(methods.values().map(|(a, _)| *a).sum()),
            count: methods.values().map(|(_, c)| *c).sum(),
        });
        daily_breakdown.push(DailyMethodBreakdown {
            date,
            methods: methods
                .into_iter()
                .map(|(method, (amount, count))| MethodAmount {
                    method,
                    amount: money(amount),
                    count,
                })
                .collect(),
        });
    }

    location_breakdown.sort_by(|a, b| a.location_name.cmp(&b.location_name));

    let metadata = reports
        .first()
        .map(|r| ReportMetadata {
            location_info: LocationInfo {
                location_id: None,
                location_name: None,
                is_multi_location: true,
            },
            ..r.metadata.clone()
        })
        .unwrap_or_default();

    PaymentsReport {
        summary,
        payment_methods,
        daily_volume,
        daily_breakdown,
        order_totals_comparison: order_totals_comparison(collected, grand_total),
        location_breakdown,
        metadata,
    }
}
