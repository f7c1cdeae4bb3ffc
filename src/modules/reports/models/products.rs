use serde::{Deserialize, Serialize};

use super::common::ReportMetadata;
use super::report_type::TrendPeriod;

pub const DEFAULT_PRODUCT_LIMIT: usize = 10;

/// Number of products that get a trend series
pub const TREND_PRODUCT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsReport {
    pub limit: usize,
    pub summary: ProductsSummary,
    pub top_by_revenue: Vec<ProductPerformance>,
    pub top_by_quantity: Vec<ProductPerformance>,
    pub category_performance: Vec<CategoryPerformance>,
    pub trend_period: TrendPeriod,
    pub product_trends: Vec<ProductTrend>,
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsSummary {
    pub products_sold: i64,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub average_price: f64,
    pub category_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPerformance {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: f64,
    pub order_count: i64,
    pub average_price: f64,
    pub revenue_share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPerformance {
    pub category: String,
    pub revenue: f64,
    pub quantity: i64,
    pub product_count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductTrend {
    pub product_id: String,
    pub name: String,
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    pub period: String,
    pub quantity: i64,
    pub revenue: f64,
}
