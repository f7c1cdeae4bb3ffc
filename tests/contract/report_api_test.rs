//! Contract tests for the reporting HTTP API
//!
//! Validates status codes, headers and JSON shapes of the report, export, cache and
//! bulk export endpoints, wired the same way as main.rs over in-memory stores.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::http::header;
use actix_web::{test, web, App};
use helpers::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tillreports::middleware::{error_handler, RequestContext, TENANT_HEADER};
use tillreports::modules::{catalog, exports, health, reports};

macro_rules! test_app {
    ($services:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestContext)
                .app_data(web::Data::new($services.config.clone()))
                .app_data(web::Data::new($services.reports.clone()))
                .app_data(web::Data::new($services.exports.clone()))
                .app_data(web::Data::new($services.bulk.clone()))
                .app_data(web::Data::new($services.queue.clone()))
                .app_data(web::Data::new($services.saved.clone()))
                .configure(error_handler::configure)
                .configure(health::controllers::configure)
                .configure(reports::controllers::configure)
                .configure(exports::controllers::configure)
                .configure(catalog::controllers::configure),
        )
        .await
    };
}

const JANUARY: &str = "start_date=2024-01-01&end_date=2024-01-31";

fn assert_error_shape(body: &Value, code: u16) {
    assert_eq!(body["error"]["code"], json!(code));
    assert!(body["error"]["message"].is_string());
}

/// Test: Summary report response carries figures and metadata
#[actix_web::test]
async fn test_get_summary_report_shape() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10), dec!(20), dec!(30)], 1).await;
    let app = test_app!(services);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/summary?{}", JANUARY))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_sales"], json!(60.0));
    assert_eq!(body["total_transactions"], json!(3));
    assert_eq!(body["tenant_id"], json!(TENANT));
    assert!(body["generated_at"].is_string());
    assert_eq!(body["date_range"]["start"], json!("2024-01-01T00:00:00+00:00"));
    assert_eq!(body["date_range"]["end"], json!("2024-02-01T00:00:00+00:00"));
    assert_eq!(body["location_info"]["is_multi_location"], json!(false));
    assert!(body["sales_trend"].is_array());
    assert!(body["payment_distribution"].is_array());
    assert!(body["order_totals_comparison"]["difference"].is_number());
}

/// Test: Every report type is routable
#[actix_web::test]
async fn test_all_report_types_respond() {
    let services = TestServices::new();
    let app = test_app!(services);

    for report_type in ["summary", "sales", "products", "payments", "operations"] {
        let req = test::TestRequest::get()
            .uri(&format!("/reports/{}?{}&group_by=weekly&limit=5", report_type, JANUARY))
            .insert_header((TENANT_HEADER, TENANT))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "{}", report_type);
    }
}

/// Test: Validation failures use the standard error body
#[actix_web::test]
async fn test_bad_requests_return_400() {
    let services = TestServices::new();
    let app = test_app!(services);

    let cases = [
        (format!("/reports/forecast?{}", JANUARY), true),
        ("/reports/summary?start_date=2024-02-01&end_date=2024-01-01".to_string(), true),
        ("/reports/summary?start_date=2022-01-01&end_date=2024-01-01".to_string(), true),
        ("/reports/summary?end_date=2024-01-01".to_string(), true),
        (format!("/reports/sales/export?{}&format=docx", JANUARY), true),
        (format!("/reports/summary?{}", JANUARY), false),
    ];

    for (uri, with_tenant) in cases {
        let mut req = test::TestRequest::get().uri(&uri);
        if with_tenant {
            req = req.insert_header((TENANT_HEADER, TENANT));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 400, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_error_shape(&body, 400);
    }
}

/// Test: Export download sets attachment headers
#[actix_web::test]
async fn test_export_download_headers() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10)], 1).await;
    let app = test_app!(services);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/sales/export?{}&format=csv", JANUARY))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let headers = resp.headers();
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("sales-report-2024-01-01-2024-01-31.csv"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"Sales Report"));
}

/// Test: Cache invalidation endpoints report what they removed
#[actix_web::test]
async fn test_cache_invalidation_endpoints() {
    let services = TestServices::new();
    let app = test_app!(services);

    for report_type in ["summary", "products"] {
        let req = test::TestRequest::get()
            .uri(&format!("/reports/{}?{}", report_type, JANUARY))
            .insert_header((TENANT_HEADER, TENANT))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post()
        .uri("/reports/cache/events")
        .insert_header((TENANT_HEADER, TENANT))
        .set_json(json!({"entity": "product"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["invalidated"], json!(1));
    assert_eq!(body["report_types"], json!(["products"]));

    let req = test::TestRequest::delete()
        .uri("/reports/cache")
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["invalidated"], json!(1));
    assert_eq!(body["report_types"].as_array().unwrap().len(), 5);
    assert!(services.cache_store.is_empty().await);
}

/// Test: Bulk export lifecycle over HTTP
#[actix_web::test]
async fn test_bulk_export_lifecycle() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10)], 1).await;
    let app = test_app!(services);

    let req = test::TestRequest::post()
        .uri("/exports/bulk")
        .insert_header((TENANT_HEADER, TENANT))
        .set_json(json!({
            "format": "csv",
            "priority": "high",
            "reports": [
                {"report_type": "summary", "start_date": "2024-01-01", "end_date": "2024-01-31"},
                {"report_type": "payments", "start_date": "2024-01-01", "end_date": "2024-01-31"}
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], json!("queued"));
    assert_eq!(body["priority"], json!("high"));
    assert_eq!(body["progress"], json!(0));
    assert!(body.get("artifact").is_none());
    let id = body["id"].as_str().unwrap().to_string();

    // Not ready yet
    let req = test::TestRequest::get()
        .uri(&format!("/exports/bulk/{}/download", id))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    services.bulk.process_next().await.unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/exports/bulk/{}", id))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], json!("completed"));
    assert_eq!(body["reports_generated"], json!(2));
    assert_eq!(body["download_filename"], json!(format!("bulk-export-{}.zip", id)));

    let req = test::TestRequest::get()
        .uri(&format!("/exports/bulk/{}/download", id))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"PK"));
}

/// Test: Unknown and malformed operation ids
#[actix_web::test]
async fn test_bulk_export_lookup_errors() {
    let services = TestServices::new();
    let app = test_app!(services);

    let req = test::TestRequest::get()
        .uri(&format!("/exports/bulk/{}", uuid::Uuid::new_v4()))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_error_shape(&body, 404);

    let req = test::TestRequest::get()
        .uri("/exports/bulk/not-a-uuid")
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/exports/bulk")
        .insert_header((TENANT_HEADER, TENANT))
        .set_json(json!({"format": "csv", "reports": []}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

/// Test: Liveness check answers without a tenant
#[actix_web::test]
async fn test_health_endpoint() {
    let services = TestServices::new();
    let app = test_app!(services);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], json!("healthy"));
}

/// Test: Bare dates cover the tenant's local days, not UTC days
#[actix_web::test]
async fn test_date_only_range_uses_business_timezone() {
    let services = TestServices::new();
    services.repo.set_timezone(TENANT, "Asia/Jakarta").await;
    // 2024-01-01 01:00 in Jakarta, inside the range
    let first_local_hour = paid_order("early", dec!(15), jan(1, 0) - chrono::Duration::hours(6), "loc-1");
    // 2024-02-01 03:00 in Jakarta, outside the range
    let next_local_day = paid_order("late", dec!(42), jan(31, 20), "loc-1");
    for order in [first_local_hour, next_local_day] {
        services.repo.add_transaction(TENANT, card_payment(&order)).await;
        services.repo.add_order(TENANT, order, vec![]).await;
    }
    let app = test_app!(services);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/summary?{}", JANUARY))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_sales"], json!(15.0));
    assert_eq!(body["date_range"]["start"], json!("2023-12-31T17:00:00+00:00"));
    assert_eq!(body["date_range"]["end"], json!("2024-01-31T17:00:00+00:00"));
    let days: Vec<&str> = body["sales_trend"]
        .as_array()
        .unwrap()
        .iter()
        .map(|point| point["date"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2024-01-01"]);

    let req = test::TestRequest::get()
        .uri(&format!("/reports/sales/export?{}&format=csv", JANUARY))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition
        .to_str()
        .unwrap()
        .contains("sales-report-2024-01-01-2024-01-31.csv"));
}

/// Test: Saved reports can be stored, listed, run on demand and audited
#[actix_web::test]
async fn test_saved_report_lifecycle() {
    let services = TestServices::new();
    let app = test_app!(services);

    let req = test::TestRequest::post()
        .uri("/reports/saved")
        .insert_header((TENANT_HEADER, TENANT))
        .set_json(json!({
            "name": "Monthly payments",
            "report_type": "payments",
            "parameters": {"location_id": "loc-1"},
            "schedule": "monthly"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["format"], json!("csv"));
    assert_eq!(created["schedule"], json!("monthly"));
    assert_eq!(created["is_active"], json!(true));
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/reports/saved")
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], json!(id));

    let req = test::TestRequest::post()
        .uri(&format!("/reports/saved/{}/run", id))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let execution_id = resp
        .headers()
        .get(reports::controllers::EXECUTION_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("payments-report-"));

    let req = test::TestRequest::get()
        .uri(&format!("/reports/saved/{}/executions", id))
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    let executions: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(executions.as_array().unwrap().len(), 1);
    assert_eq!(executions[0]["id"], json!(execution_id));
    assert_eq!(executions[0]["status"], json!("completed"));
    assert!(executions[0]["output_size"].as_i64().unwrap() > 0);

    // Other tenants cannot see or run it
    let req = test::TestRequest::post()
        .uri(&format!("/reports/saved/{}/run", id))
        .insert_header((TENANT_HEADER, "other-tenant"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

/// Test: Invalid saved report definitions and unknown ids
#[actix_web::test]
async fn test_saved_report_errors() {
    let services = TestServices::new();
    let app = test_app!(services);

    for body in [
        json!({"name": "x", "report_type": "inventory"}),
        json!({"name": "", "report_type": "sales"}),
        json!({"name": "x", "report_type": "sales", "schedule": "hourly"}),
        json!({"name": "x", "report_type": "sales", "parameters": {"limit": "ten"}}),
    ] {
        let req = test::TestRequest::post()
            .uri("/reports/saved")
            .insert_header((TENANT_HEADER, TENANT))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_error_shape(&body, 400);
    }

    let req = test::TestRequest::get()
        .uri("/reports/saved/missing/executions")
        .insert_header((TENANT_HEADER, TENANT))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

/// Test: Modifier selection check over HTTP, including a malformed rule
#[actix_web::test]
async fn test_modifier_validation_endpoint() {
    let services = TestServices::new();
    let app = test_app!(services);

    let req = test::TestRequest::post()
        .uri("/catalog/modifiers/validate")
        .set_json(json!({
            "modifier_set": {
                "id": "shots",
                "name": "Extra shots",
                "rule": {"selection_type": "quantity", "max_per_option": 2, "max_total": 3},
                "option_ids": ["shot", "decaf"]
            },
            "selections": [
                {"option_id": "shot", "quantity": 3},
                {"option_id": "decaf", "quantity": 0}
            ]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["valid"], json!(false));
    let codes: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["zero_quantity", "quantity_exceeded"]);

    let req = test::TestRequest::post()
        .uri("/catalog/modifiers/validate")
        .set_json(json!({
            "modifier_set": {
                "id": "milk",
                "name": "Milk",
                "rule": {"selection_type": "any"},
                "option_ids": []
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error_shape(&body, 400);
}
