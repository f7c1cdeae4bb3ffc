use crate::core::timezone::parse_timezone;
use crate::core::{AppError, Result};
use crate::modules::reports::models::ReportType;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

pub const MIN_TTL_HOURS: u32 = 1;
pub const MAX_TTL_HOURS: u32 = 24;

/// Reporting engine settings: timezone default, cache lifetimes, bulk export limits
#[derive(Debug, Clone)]
pub struct ReportsConfig {
    pub default_timezone: Tz,
    pub cache_ttl: CacheTtlConfig,
    pub cache_cleanup_interval_secs: u64,
    pub max_range_days: i64,
    pub bulk_max_reports: usize,
    pub bulk_max_range_days: i64,
    pub bulk_poll_interval_secs: u64,
    /// How long finished bulk exports stay downloadable
    pub bulk_retention_secs: u64,
    /// How often scheduled saved reports are checked
    pub saved_report_interval_secs: u64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            default_timezone: Tz::UTC,
            cache_ttl: CacheTtlConfig::default(),
            cache_cleanup_interval_secs: 3600,
            max_range_days: 365,
            bulk_max_reports: 10,
            bulk_max_range_days: 365,
            bulk_poll_interval_secs: 5,
            bulk_retention_secs: 86_400,
            saved_report_interval_secs: 300,
        }
    }
}

impl ReportsConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = ReportsConfig::default();

        let default_timezone = match env::var("BUSINESS_TIMEZONE") {
            Ok(name) => parse_timezone(&name).map_err(AppError::Configuration)?,
            Err(_) => defaults.default_timezone,
        };

        Ok(ReportsConfig {
            default_timezone,
            cache_ttl: CacheTtlConfig::from_env()?,
            cache_cleanup_interval_secs: parse_var(
                "REPORT_CACHE_CLEANUP_INTERVAL_SECS",
                defaults.cache_cleanup_interval_secs,
            )?,
            max_range_days: parse_var("REPORT_MAX_RANGE_DAYS", defaults.max_range_days)?,
            bulk_max_reports: parse_var("BULK_EXPORT_MAX_REPORTS", defaults.bulk_max_reports)?,
            bulk_max_range_days: parse_var(
                "BULK_EXPORT_MAX_RANGE_DAYS",
                defaults.bulk_max_range_days,
            )?,
            bulk_poll_interval_secs: parse_var(
                "BULK_EXPORT_POLL_INTERVAL_SECS",
                defaults.bulk_poll_interval_secs,
            )?,
            bulk_retention_secs: parse_var(
                "BULK_EXPORT_RETENTION_SECS",
                defaults.bulk_retention_secs,
            )?,
            saved_report_interval_secs: parse_var(
                "SAVED_REPORT_INTERVAL_SECS",
                defaults.saved_report_interval_secs,
            )?,
        })
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cache_cleanup_interval_secs)
    }

    pub fn bulk_poll_interval(&self) -> Duration {
        Duration::from_secs(self.bulk_poll_interval_secs)
    }

    pub fn bulk_retention(&self) -> Duration {
        Duration::from_secs(self.bulk_retention_secs)
    }

    pub fn saved_report_interval(&self) -> Duration {
        Duration::from_secs(self.saved_report_interval_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_cleanup_interval_secs == 0
            || self.bulk_poll_interval_secs == 0
            || self.saved_report_interval_secs == 0
        {
            return Err(AppError::Configuration(
                "Background job intervals must be greater than 0".to_string(),
            ));
        }

        if self.max_range_days <= 0 || self.bulk_max_range_days <= 0 {
            return Err(AppError::Configuration(
                "Maximum report range must be greater than 0 days".to_string(),
            ));
        }

        if self.bulk_retention_secs == 0 {
            return Err(AppError::Configuration(
                "BULK_EXPORT_RETENTION_SECS must be greater than 0".to_string(),
            ));
        }

        if self.bulk_max_reports == 0 {
            return Err(AppError::Configuration(
                "BULK_EXPORT_MAX_REPORTS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Cache lifetime per report type, in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlConfig {
    pub summary: u32,
    pub sales: u32,
    pub products: u32,
    pub payments: u32,
    pub operations: u32,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            summary: ReportType::Summary.default_ttl_hours(),
            sales: ReportType::Sales.default_ttl_hours(),
            products: ReportType::Products.default_ttl_hours(),
            payments: ReportType::Payments.default_ttl_hours(),
            operations: ReportType::Operations.default_ttl_hours(),
        }
    }
}

impl CacheTtlConfig {
    /// Reads `REPORT_CACHE_TTL_<TYPE>_HOURS`; values outside 1-24 are clamped
    pub fn from_env() -> Result<Self> {
        let mut ttl = CacheTtlConfig::default();
        for report_type in ReportType::ALL {
            let key = format!(
                "REPORT_CACHE_TTL_{}_HOURS",
                report_type.as_str().to_uppercase()
            );
            let hours: u32 = parse_var(&key, report_type.default_ttl_hours())?;
            ttl.set(report_type, hours);
        }
        Ok(ttl)
    }

    pub fn hours(&self, report_type: ReportType) -> u32 {
        match report_type {
            ReportType::Summary => self.summary,
            ReportType::Sales => self.sales,
            ReportType::Products => self.products,
            ReportType::Payments => self.payments,
            ReportType::Operations => self.operations,
        }
    }

    pub fn set(&mut self, report_type: ReportType, hours: u32) {
        let hours = hours.clamp(MIN_TTL_HOURS, MAX_TTL_HOURS);
        match report_type {
            ReportType::Summary => self.summary = hours,
            ReportType::Sales => self.sales = hours,
            ReportType::Products => self.products = hours,
            ReportType::Payments => self.payments = hours,
            ReportType::Operations => self.operations = hours,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        Err(_) => Ok(default),
    }
}
