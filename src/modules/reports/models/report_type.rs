use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report families produced by the reporting engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Summary,
    Sales,
    Products,
    Payments,
    Operations,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Summary,
        ReportType::Sales,
        ReportType::Products,
        ReportType::Payments,
        ReportType::Operations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Summary => "summary",
            ReportType::Sales => "sales",
            ReportType::Products => "products",
            ReportType::Payments => "payments",
            ReportType::Operations => "operations",
        }
    }

    /// Cache lifetime in hours, reflecting how stale each report may get.
    /// Dashboards (summary, operations) refresh hourly; product mix moves slowly.
    pub fn default_ttl_hours(&self) -> u32 {
        match self {
            ReportType::Summary | ReportType::Operations => 1,
            ReportType::Sales | ReportType::Payments => 2,
            ReportType::Products => 12,
        }
    }

    /// Human-readable title used in export headers
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Summary => "Summary Report",
            ReportType::Sales => "Sales Report",
            ReportType::Products => "Products Report",
            ReportType::Payments => "Payments Report",
            ReportType::Operations => "Operations Report",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(ReportType::Summary),
            "sales" => Ok(ReportType::Sales),
            "products" | "product" => Ok(ReportType::Products),
            "payments" | "payment" => Ok(ReportType::Payments),
            "operations" | "operational" => Ok(ReportType::Operations),
            _ => Err(format!("Unknown report type: {}", s)),
        }
    }
}

/// Downloadable export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(format!("Unsupported export format: {}", s)),
        }
    }
}

/// Time-bucket granularity for trends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "daily",
            TrendPeriod::Weekly => "weekly",
            TrendPeriod::Monthly => "monthly",
        }
    }

    /// Pick a granularity from the length of the range: up to a week is daily,
    /// up to two months weekly, anything longer monthly.
    pub fn for_range_days(days: i64) -> Self {
        if days <= 7 {
            TrendPeriod::Daily
        } else if days <= 60 {
            TrendPeriod::Weekly
        } else {
            TrendPeriod::Monthly
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(TrendPeriod::Daily),
            "week" | "weekly" => Ok(TrendPeriod::Weekly),
            "month" | "monthly" => Ok(TrendPeriod::Monthly),
            _ => Err(format!("Invalid period: {}", s)),
        }
    }
}
