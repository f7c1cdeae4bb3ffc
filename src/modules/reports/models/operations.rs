use serde::{Deserialize, Serialize};

use super::common::ReportMetadata;

pub const PEAK_HOUR_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationsReport {
    pub summary: OperationsSummary,
    pub hourly_patterns: Vec<HourlyPattern>,
    pub peak_hours: Vec<HourlyPattern>,
    pub daily_volume: Vec<DailyOrderVolume>,
    pub peak_day: Option<DailyOrderVolume>,
    pub slowest_day: Option<DailyOrderVolume>,
    pub staff_performance: Vec<StaffPerformance>,
    #[serde(flatten)]
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationsSummary {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub busiest_hour: Option<u32>,
    pub active_staff: i64,
    pub average_daily_orders: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyPattern {
    pub hour: u32,
    pub orders: i64,
    pub revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyOrderVolume {
    pub date: String,
    pub orders: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffPerformance {
    pub cashier_id: Option<String>,
    pub name: String,
    pub orders: i64,
    pub revenue: f64,
    pub average_order_value: f64,
}
