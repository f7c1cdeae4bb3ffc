use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tillreports::core::timezone::{
    format_iso8601, local_hour, parse_boundary, parse_timezone, trunc_date_local,
    truncate_to_period,
};
use tillreports::core::TimezoneResolver;
use tillreports::modules::reports::models::TrendPeriod;
use tillreports::modules::reports::repositories::InMemoryReportRepository;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_utc_evening_is_next_day_in_jakarta() {
    // 18:30 UTC is 01:30 the next morning in Asia/Jakarta (UTC+7)
    let tz = parse_timezone("Asia/Jakarta").unwrap();
    let ts = Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap();

    assert_eq!(trunc_date_local(ts, tz), date(2024, 3, 11));
    assert_eq!(local_hour(ts, tz), 1);
}

#[test]
fn test_new_york_dst_shift_moves_local_hour() {
    let tz = parse_timezone("America/New_York").unwrap();

    // EST (UTC-5) before the March switch, EDT (UTC-4) after
    let winter = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();
    let summer = Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap();

    assert_eq!(local_hour(winter, tz), 9);
    assert_eq!(local_hour(summer, tz), 10);
}

#[test]
fn test_unknown_timezone_is_rejected() {
    assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    assert!(parse_timezone(" Europe/Berlin ").is_ok());
}

#[test]
fn test_period_truncation() {
    // 2024-01-17 is a Wednesday
    let wednesday = date(2024, 1, 17);

    assert_eq!(truncate_to_period(wednesday, TrendPeriod::Daily), wednesday);
    assert_eq!(truncate_to_period(wednesday, TrendPeriod::Weekly), date(2024, 1, 15));
    assert_eq!(truncate_to_period(wednesday, TrendPeriod::Monthly), date(2024, 1, 1));
}

#[test]
fn test_trend_period_thresholds() {
    assert_eq!(TrendPeriod::for_range_days(1), TrendPeriod::Daily);
    assert_eq!(TrendPeriod::for_range_days(7), TrendPeriod::Daily);
    assert_eq!(TrendPeriod::for_range_days(8), TrendPeriod::Weekly);
    assert_eq!(TrendPeriod::for_range_days(60), TrendPeriod::Weekly);
    assert_eq!(TrendPeriod::for_range_days(61), TrendPeriod::Monthly);
}

#[test]
fn test_boundaries_and_iso_format() {
    let start = parse_boundary("2024-01-01", false, Tz::UTC).unwrap();
    let end = parse_boundary("2024-01-31", true, Tz::UTC).unwrap();

    assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    assert_eq!(format_iso8601(start), "2024-01-01T00:00:00+00:00");

    let explicit = parse_boundary("2024-01-31T12:00:00+07:00", true, Tz::UTC).unwrap();
    assert_eq!(explicit, Utc.with_ymd_and_hms(2024, 1, 31, 5, 0, 0).unwrap());
}

#[tokio::test]
async fn test_resolver_uses_tenant_setting_then_default() {
    let repo = Arc::new(InMemoryReportRepository::new());
    repo.set_timezone("jakarta-shop", "Asia/Jakarta").await;
    repo.set_timezone("broken-shop", "Not/AZone").await;

    let resolver = TimezoneResolver::new(repo, chrono_tz::Tz::UTC);

    assert_eq!(
        resolver.get_local_timezone("jakarta-shop").await,
        chrono_tz::Asia::Jakarta
    );
    assert_eq!(resolver.get_local_timezone("broken-shop").await, chrono_tz::Tz::UTC);
    assert_eq!(resolver.get_local_timezone("unknown").await, chrono_tz::Tz::UTC);
}
