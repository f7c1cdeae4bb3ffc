//! Unit tests for report cache keys
//!
//! Keys are SHA-256 digests of the report type plus canonicalised parameters, so
//! the order in which parameters are supplied must never change the key.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tillreports::modules::reports::models::ReportType;
use tillreports::modules::reports::services::cache_service::canonical_json;
use tillreports::modules::reports::services::ReportCacheService;

fn object(pairs: &[(String, i64)]) -> Value {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.insert(key.clone(), json!(value));
    }
    Value::Object(map)
}

/// Test: Key is a 64-character lowercase hex digest
#[test]
fn test_key_is_sha256_hex() {
    let key = ReportCacheService::generate_cache_key(
        ReportType::Summary,
        &json!({"start_date": "2024-01-01T00:00:00+00:00"}),
    );

    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

/// Test: Same parameters under different report types give different keys
#[test]
fn test_report_type_is_part_of_the_key() {
    let params = json!({"start_date": "2024-01-01", "end_date": "2024-01-31"});
    let summary = ReportCacheService::generate_cache_key(ReportType::Summary, &params);
    let sales = ReportCacheService::generate_cache_key(ReportType::Sales, &params);

    assert_ne!(summary, sales);
}

/// Test: Nested objects are canonicalised too
#[test]
fn test_nested_keys_are_sorted() {
    let a = json!({"b": {"y": 1, "x": 2}, "a": [1, 2]});
    let b = json!({"a": [1, 2], "b": {"x": 2, "y": 1}});

    assert_eq!(canonical_json(&a), canonical_json(&b));
    assert_eq!(canonical_json(&a), r#"{"a":[1,2],"b":{"x":2,"y":1}}"#);
}

/// Test: A null location differs from a concrete one
#[test]
fn test_location_changes_the_key() {
    let all = json!({"start_date": "2024-01-01", "location_id": null});
    let one = json!({"start_date": "2024-01-01", "location_id": "loc-1"});

    assert_ne!(
        ReportCacheService::generate_cache_key(ReportType::Payments, &all),
        ReportCacheService::generate_cache_key(ReportType::Payments, &one)
    );
}

proptest! {
    /// Property: key is independent of parameter insertion order
    #[test]
    fn prop_key_ignores_parameter_order(
        pairs in prop::collection::btree_map("[a-z_]{1,12}", any::<i64>(), 0..8)
    ) {
        let forward: Vec<(String, i64)> = pairs.clone().into_iter().collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = ReportCacheService::generate_cache_key(ReportType::Sales, &object(&forward));
        let b = ReportCacheService::generate_cache_key(ReportType::Sales, &object(&reversed));
        prop_assert_eq!(a, b);
    }

    /// Property: changing any value changes the key
    #[test]
    fn prop_key_tracks_values(
        key in "[a-z]{1,8}",
        value in any::<i64>(),
    ) {
        let original = object(&[(key.clone(), value)]);
        let changed = object(&[(key, value.wrapping_add(1))]);

        prop_assert_ne!(
            ReportCacheService::generate_cache_key(ReportType::Operations, &original),
            ReportCacheService::generate_cache_key(ReportType::Operations, &changed)
        );
    }
}
