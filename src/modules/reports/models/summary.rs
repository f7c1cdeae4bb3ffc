use serde::{Deserialize, Serialize};

use super::common::{OrderTotalsComparison, ProductSales, ReportMetadata};

/// Dashboard summary for a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryReport {
    /// Sum of `Payment.total_collected` over completed orders
    pub total_sales: f64,
    pub total_transactions: i64,
    pub average_ticket: f64,
    pub total_tax: f64,
    pub total_discounts: f64,
    pub total_tips: f64,
    pub total_items: i64,
    /// Percent change of total_sales against the previous period of equal length
    pub sales_growth: f64,
    pub transaction_growth: f64,
    pub sales_trend: Vec<DailySalesPoint>,
    pub payment_distribution: Vec<PaymentShare>,
    pub hourly_performance: Vec<HourlyPerformance>,
    pub top_product: Option<ProductSales>,
    pub top_products: Vec<ProductSales>,
    pub order_totals_comparison: OrderTotalsComparison,
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySalesPoint {
    pub date: String,
    pub sales: f64,
    pub transactions: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentShare {
    pub method: String,
    pub amount: f64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyPerformance {
    pub hour: u32,
    pub sales: f64,
    pub transactions: i64,
}
