use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::core::Result;
use crate::modules::reports::models::TrendPeriod;

/// Source of a tenant's configured business timezone (IANA name)
#[async_trait]
pub trait TimezoneSource: Send + Sync {
    async fn business_timezone(&self, tenant_id: &str) -> Result<Option<String>>;
}

/// Resolves the local timezone used to bucket report data by calendar date.
///
/// All timestamps are stored as UTC; grouping by "day" or "hour" must happen on the
/// business's wall clock, otherwise late-evening sales land on the next day.
#[derive(Clone)]
pub struct TimezoneResolver {
    source: Arc<dyn TimezoneSource>,
    default_tz: Tz,
}

impl TimezoneResolver {
    pub fn new(source: Arc<dyn TimezoneSource>, default_tz: Tz) -> Self {
        Self { source, default_tz }
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_tz
    }

    /// Resolve the tenant's timezone, falling back to the system default.
    ///
    /// Lookup failures and unknown zone names are logged, never returned.
    pub async fn get_local_timezone(&self, tenant_id: &str) -> Tz {
        match self.source.business_timezone(tenant_id).await {
            Ok(Some(name)) => match parse_timezone(&name) {
                Ok(tz) => tz,
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        timezone = %name,
                        error = %e,
                        "Invalid business timezone, using default"
                    );
                    self.default_tz
                }
            },
            Ok(None) => self.default_tz,
            Err(e) => {
                warn!(
                    tenant_id = %tenant_id,
                    error = %e,
                    "Failed to load business timezone, using default"
                );
                self.default_tz
            }
        }
    }
}

/// Parse an IANA timezone name (e.g. "Asia/Jakarta")
pub fn parse_timezone(name: &str) -> std::result::Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| format!("Unknown timezone '{}': {}", name, e))
}

/// Local calendar date of a UTC timestamp
pub fn trunc_date_local(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDate {
    timestamp.with_timezone(&tz).date_naive()
}

/// Local hour of day (0-23) of a UTC timestamp
pub fn local_hour(timestamp: DateTime<Utc>, tz: Tz) -> u32 {
    timestamp.with_timezone(&tz).hour()
}

/// First local date of the bucket containing `date` (weeks start on Monday)
pub fn truncate_to_period(date: NaiveDate, period: TrendPeriod) -> NaiveDate {
    match period {
        TrendPeriod::Daily => date,
        TrendPeriod::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        TrendPeriod::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Format timestamp as ISO 8601 UTC for report metadata
pub fn format_iso8601(utc_time: DateTime<Utc>) -> String {
    utc_time.to_rfc3339()
}

/// First instant of a local calendar date in `tz`, as UTC.
///
/// When a DST jump skips local midnight the day starts at the first valid hour.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Parse a request date boundary: RFC 3339, or a bare `YYYY-MM-DD` read as local
/// midnight in the business timezone. A bare end date covers the whole day, so it
/// resolves to the following local midnight.
pub fn parse_boundary(
    value: &str,
    is_end: bool,
    tz: Tz,
) -> std::result::Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD or RFC 3339", value))?;
    let date = if is_end { date + Duration::days(1) } else { date };
    Ok(local_midnight(date, tz))
}
