use serde::{Deserialize, Serialize};

use super::common::{OrderTotalsComparison, ReportMetadata};
use super::report_type::TrendPeriod;

/// Period-bucketed sales with drill-down and reconciliation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesReport {
    pub group_by: TrendPeriod,
    pub summary: SalesSummary,
    pub sales_data: Vec<SalesPeriod>,
    pub category_breakdown: Vec<CategorySales>,
    pub top_hours: Vec<HourlyRevenue>,
    pub payment_reconciliation: PaymentReconciliation,
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSummary {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub total_items: i64,
    pub average_order_value: f64,
    pub total_tax: f64,
    pub total_discounts: f64,
    pub total_tips: f64,
    pub revenue_growth: f64,
    pub order_growth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesPeriod {
    /// First local date of the bucket (`YYYY-MM-DD`)
    pub period: String,
    pub revenue: f64,
    pub orders: i64,
    pub items: i64,
    pub payment_methods: Vec<MethodDrilldown>,
}

/// Successful transactions of one bucket for one tender type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDrilldown {
    pub method: String,
    pub amount: f64,
    pub count: i64,
    pub transactions: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDetail {
    pub transaction_id: String,
    pub order_id: String,
    pub order_number: String,
    pub amount: f64,
    pub tip: f64,
    pub surcharge: f64,
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySales {
    pub category: String,
    pub revenue: f64,
    pub quantity: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyRevenue {
    pub hour: u32,
    pub revenue: f64,
    pub orders: i64,
}

/// Order completion vs payment success vs transaction success
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentReconciliation {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub order_completion_rate: f64,
    pub orders_with_payment: i64,
    pub payment_success_rate: f64,
    pub total_transactions: i64,
    pub successful_transactions: i64,
    pub transaction_success_rate: f64,
    pub order_totals_comparison: OrderTotalsComparison,
}
