use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::timezone::format_iso8601;
use crate::modules::reports::models::facts::ReportScope;

/// Inputs shared by every report generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub tenant_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location_id: Option<String>,
    pub use_cache: bool,
}

impl ReportRequest {
    pub fn new(tenant_id: impl Into<String>, start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            start_date,
            end_date,
            location_id: None,
            use_cache: true,
        }
    }

    pub fn with_location(mut self, location_id: Option<String>) -> Self {
        self.location_id = location_id;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn scope(&self) -> ReportScope {
        ReportScope::new(
            self.tenant_id.clone(),
            self.start_date,
            self.end_date,
            self.location_id.clone(),
        )
    }

    /// Length of the window in whole days, partial days rounded up
    pub fn range_days(&self) -> i64 {
        let seconds = (self.end_date - self.start_date).num_seconds().max(0);
        (seconds + 86_399) / 86_400
    }

    /// Parameters common to every cache key. Generators add their own options on top.
    pub fn cache_parameters(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("start_date".to_string(), Value::String(format_iso8601(self.start_date)));
        params.insert("end_date".to_string(), Value::String(format_iso8601(self.end_date)));
        params.insert(
            "location_id".to_string(),
            self.location_id
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn from_request(request: &ReportRequest) -> Self {
        Self {
            start: format_iso8601(request.start_date),
            end: format_iso8601(request.end_date),
        }
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.start)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.end)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// `YYYY-MM-DD` part of the start, for filenames
    pub fn start_day(&self) -> &str {
        self.start.get(..10).unwrap_or(&self.start)
    }

    pub fn end_day(&self) -> &str {
        self.end.get(..10).unwrap_or(&self.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub is_multi_location: bool,
}

/// Metadata attached to every generated report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
    pub tenant_id: String,
    pub generated_at: String,
    pub date_range: DateRange,
    pub location_info: LocationInfo,
}

/// Payment-collected revenue against order grand totals.
///
/// The two can diverge (rounding, tips, partial payments); `difference` surfaces it
/// instead of hiding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTotalsComparison {
    pub payment_total_collected: f64,
    pub order_grand_total: f64,
    pub difference: f64,
}

/// A product's sales over the report window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSales {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}
