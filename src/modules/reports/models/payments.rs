use serde::{Deserialize, Serialize};

use super::common::{OrderTotalsComparison, ReportMetadata};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsReport {
    pub summary: PaymentsSummary,
    pub payment_methods: Vec<PaymentMethodBreakdown>,
    pub daily_volume: Vec<DailyVolume>,
    pub daily_breakdown: Vec<DailyMethodBreakdown>,
    pub order_totals_comparison: OrderTotalsComparison,
    /// Per-location totals; only filled in multi-location mode
    pub location_breakdown: Vec<LocationPaymentSummary>,
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsSummary {
    /// Sum of `Payment.total_collected` over completed orders
    pub total_revenue: f64,
    pub total_transactions: i64,
    pub successful_transactions: i64,
    pub failed_transactions: i64,
    pub refunded_transactions: i64,
    pub canceled_transactions: i64,
    pub success_rate: f64,
    /// Sum of processed transaction amounts
    pub total_processed: f64,
    pub total_tips: f64,
    pub total_surcharges: f64,
    pub total_processing_fees: f64,
    pub total_refunded: f64,
    pub net_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethodBreakdown {
    pub method: String,
    pub amount: f64,
    pub count: i64,
    pub average_amount: f64,
    pub processing_fees: f64,
    pub refunded_amount: f64,
    pub refund_count: i64,
    pub net_amount: f64,
    /// Share of total processed volume
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyVolume {
    pub date: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyMethodBreakdown {
    pub date: String,
    pub methods: Vec<MethodAmount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodAmount {
    pub method: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationPaymentSummary {
    pub location_id: String,
    pub location_name: String,
    pub total_revenue: f64,
    pub total_processed: f64,
    pub total_transactions: i64,
    pub success_rate: f64,
}
