//! Integration tests for report generation
//!
//! Runs every generator end to end over the in-memory repository and checks the
//! headline figures against hand-computed totals.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use rust_decimal_macros::dec;
use rust_decimal::Decimal;
use tillreports::modules::reports::models::{
    CashierRef, OperationsReport, OrderFact, OrderStatus, PaymentMethod, PaymentsReport,
    ProductsReport, ReportRequest, ReportType, SalesReport, SummaryReport, TransactionStatus,
    TrendPeriod,
};
use tillreports::modules::reports::services::{ProductReportOptions, ReportOptions};

fn january() -> ReportRequest {
    ReportRequest::new(TENANT, jan(1, 0), jan(31, 0))
}

/// Paid order settled by one successful transaction of `method`
async fn add_paid(services: &TestServices, order: OrderFact, method: PaymentMethod) {
    let mut tx = card_payment(&order);
    tx.method = method;
    services.repo.add_transaction(TENANT, tx).await;
    services.repo.add_order(TENANT, order, vec![]).await;
}

/// Test: Three paid orders of 10, 20 and 30
#[tokio::test]
async fn test_summary_totals_for_three_orders() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10), dec!(20), dec!(30)], 1).await;

    let report: SummaryReport = services
        .reports
        .summary()
        .generate_summary_report(&january())
        .await
        .unwrap();

    assert_eq!(report.total_sales, 60.0);
    assert_eq!(report.total_transactions, 3);
    assert_eq!(report.average_ticket, 20.0);
    // Nothing in December, so growth is defined as zero
    assert_eq!(report.sales_growth, 0.0);
    assert_eq!(report.transaction_growth, 0.0);
    assert_eq!(report.order_totals_comparison.difference, 0.0);
    assert_eq!(report.payment_distribution.len(), 1);
    assert_eq!(report.payment_distribution[0].percentage, 100.0);
    assert_eq!(report.metadata.tenant_id, TENANT);
}

/// Test: Item count sums line quantities across orders
#[tokio::test]
async fn test_total_items_counts_every_unit() {
    let services = TestServices::new();
    let n = 7;
    let amounts = vec![dec!(12); n];
    services.seed_orders(&amounts, 2).await;

    let summary = services
        .reports
        .summary()
        .generate_summary_report(&january())
        .await
        .unwrap();
    assert_eq!(summary.total_items, 2 * n as i64);

    let sales: SalesReport = services
        .reports
        .sales()
        .generate_sales_report(&january(), Default::default())
        .await
        .unwrap();
    assert_eq!(sales.summary.total_items, 2 * n as i64);
    assert_eq!(sales.summary.total_orders, n as i64);
}

/// Test: An empty period produces a well-formed zero report for every type
#[tokio::test]
async fn test_zero_orders_is_safe_for_every_report() {
    let services = TestServices::new();

    for report_type in ReportType::ALL {
        let payload = services
            .reports
            .generate(report_type, &january(), &ReportOptions::default())
            .await
            .unwrap();
        assert!(payload.is_object(), "{} payload", report_type);
    }

    let summary = services
        .reports
        .summary()
        .generate_summary_report(&january().with_cache(false))
        .await
        .unwrap();
    assert_eq!(summary.total_sales, 0.0);
    assert_eq!(summary.average_ticket, 0.0);
    assert!(summary.top_product.is_none());

    let payments: PaymentsReport = services
        .reports
        .payments()
        .generate_payments_report(&january().with_cache(false))
        .await
        .unwrap();
    assert_eq!(payments.summary.success_rate, 0.0);
}

/// Test: Growth compares against the preceding window of equal length
#[tokio::test]
async fn test_growth_against_previous_period() {
    let services = TestServices::new();
    let previous = paid_order("old", dec!(50), jan(2, 12), "loc-1");
    services.repo.add_order(TENANT, previous, vec![]).await;
    let current = paid_order("new", dec!(75), jan(5, 12), "loc-1");
    services.repo.add_order(TENANT, current, vec![]).await;

    // Window Jan 4..Jan 7, previous window Jan 1..Jan 4
    let request = ReportRequest::new(TENANT, jan(4, 0), jan(7, 0));
    let report = services
        .reports
        .summary()
        .generate_summary_report(&request)
        .await
        .unwrap();

    assert_eq!(report.total_sales, 75.0);
    assert_eq!(report.sales_growth, 50.0);
    assert_eq!(report.transaction_growth, 0.0);
}

/// Test: Void and zero-subtotal orders never count as revenue
#[tokio::test]
async fn test_only_completed_orders_are_reported() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10)], 1).await;

    let mut void = paid_order("void", dec!(99), jan(10, 12), "loc-1");
    void.status = OrderStatus::Void;
    services.repo.add_order(TENANT, void, vec![]).await;

    let mut comp = paid_order("comp", dec!(0), jan(10, 13), "loc-1");
    comp.subtotal = dec!(0);
    services.repo.add_order(TENANT, comp, vec![]).await;

    let report: OperationsReport = services
        .reports
        .operations()
        .generate_operations_report(&january())
        .await
        .unwrap();

    assert_eq!(report.summary.total_orders, 1);
    assert_eq!(report.summary.total_revenue, 10.0);
    assert_eq!(report.staff_performance.len(), 1);
    assert_eq!(report.staff_performance[0].name, "Casey Till");
}

/// Test: Other tenants' data never leaks into a report
#[tokio::test]
async fn test_reports_are_tenant_scoped() {
    let services = TestServices::new();
    services.seed_orders(&[dec!(10)], 1).await;
    let foreign = paid_order("foreign", dec!(500), jan(10, 12), "loc-9");
    services.repo.add_order("other-tenant", foreign, vec![]).await;

    let report = services
        .reports
        .summary()
        .generate_summary_report(&january())
        .await
        .unwrap();

    assert_eq!(report.total_sales, 10.0);
}

/// Test: Products ranking by revenue and quantity
#[tokio::test]
async fn test_product_rankings() {
    let services = TestServices::new();
    let order = paid_order("o1", dec!(23), jan(10, 9), "loc-1");
    services
        .repo
        .add_order(
            TENANT,
            order,
            vec![
                line("p1", "Latte", 1, dec!(5)),
                line("p2", "Bagel", 6, dec!(3)),
            ],
        )
        .await;

    let report: ProductsReport = services
        .reports
        .products()
        .generate_products_report(&january(), Default::default())
        .await
        .unwrap();

    assert_eq!(report.summary.products_sold, 2);
    assert_eq!(report.summary.total_quantity, 7);
    assert_eq!(report.summary.total_revenue, 23.0);
    assert_eq!(report.top_by_revenue[0].name, "Bagel");
    assert_eq!(report.top_by_quantity[0].quantity, 6);
}

/// Test: Multi-location tenants get a consolidated payments report
#[tokio::test]
async fn test_payments_consolidate_across_locations() {
    let services = TestServices::new();
    services.repo.add_location(TENANT, location("loc-1", "Downtown")).await;
    services.repo.add_location(TENANT, location("loc-2", "Airport")).await;

    for (id, amount, loc) in [("a", dec!(10), "loc-1"), ("b", dec!(30), "loc-2")] {
        let order = paid_order(id, amount, jan(10, 12), loc);
        services.repo.add_transaction(TENANT, card_payment(&order)).await;
        services.repo.add_order(TENANT, order, vec![]).await;
    }

    let report = services
        .reports
        .payments()
        .generate_payments_report(&january())
        .await
        .unwrap();

    assert!(report.metadata.location_info.is_multi_location);
    assert_eq!(report.summary.total_processed, 40.0);
    assert_eq!(report.summary.total_transactions, 2);
    assert_eq!(report.summary.success_rate, 100.0);
    assert_eq!(report.location_breakdown.len(), 2);
    assert_eq!(report.location_breakdown[0].location_name, "Airport");
}

/// Test: Weekly and monthly buckets start on Monday and on the 1st
#[tokio::test]
async fn test_sales_week_and_month_buckets() {
    let services = TestServices::new();
    // 2024-01-01 is a Monday
    add_paid(&services, paid_order("a", dec!(10), jan(2, 9), "loc-1"), PaymentMethod::Card).await;
    add_paid(&services, paid_order("b", dec!(20), jan(4, 9), "loc-1"), PaymentMethod::Cash).await;
    add_paid(&services, paid_order("c", dec!(30), jan(9, 9), "loc-1"), PaymentMethod::Card).await;
    add_paid(&services, paid_order("d", dec!(40), jan(20, 9), "loc-1"), PaymentMethod::Card).await;

    let weekly: SalesReport = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Weekly)
        .await
        .unwrap();
    let periods: Vec<(&str, f64, i64)> = weekly
        .sales_data
        .iter()
        .map(|p| (p.period.as_str(), p.revenue, p.orders))
        .collect();
    assert_eq!(
        periods,
        vec![
            ("2024-01-01", 30.0, 2),
            ("2024-01-08", 30.0, 1),
            ("2024-01-15", 40.0, 1),
        ]
    );

    let monthly = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Monthly)
        .await
        .unwrap();
    assert_eq!(monthly.group_by, TrendPeriod::Monthly);
    assert_eq!(monthly.sales_data.len(), 1);
    assert_eq!(monthly.sales_data[0].period, "2024-01-01");
    assert_eq!(monthly.sales_data[0].revenue, 100.0);
    assert_eq!(monthly.sales_data[0].orders, 4);
}

/// Test: Each bucket drills down into its own transactions per payment method
#[tokio::test]
async fn test_sales_bucket_drilldown_by_method() {
    let services = TestServices::new();
    add_paid(&services, paid_order("a", dec!(10), jan(2, 9), "loc-1"), PaymentMethod::Card).await;
    add_paid(&services, paid_order("b", dec!(20), jan(4, 9), "loc-1"), PaymentMethod::Cash).await;
    add_paid(&services, paid_order("c", dec!(5), jan(4, 11), "loc-1"), PaymentMethod::Card).await;
    add_paid(&services, paid_order("d", dec!(30), jan(9, 9), "loc-1"), PaymentMethod::Mobile).await;

    let report = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Weekly)
        .await
        .unwrap();

    let first_week = &report.sales_data[0];
    assert_eq!(first_week.payment_methods.len(), 2);
    let card = first_week
        .payment_methods
        .iter()
        .find(|m| m.method == "CARD")
        .unwrap();
    assert_eq!(card.amount, 15.0);
    assert_eq!(card.count, 2);
    let card_orders: Vec<&str> = card.transactions.iter().map(|t| t.order_id.as_str()).collect();
    assert_eq!(card_orders, vec!["a", "c"]);
    let cash = first_week
        .payment_methods
        .iter()
        .find(|m| m.method == "CASH")
        .unwrap();
    assert_eq!(cash.amount, 20.0);
    assert_eq!(cash.transactions[0].order_number, "ORD-b");

    let second_week = &report.sales_data[1];
    assert_eq!(second_week.payment_methods.len(), 1);
    assert_eq!(second_week.payment_methods[0].method, "MOBILE");
    assert_eq!(second_week.payment_methods[0].amount, 30.0);
}

/// Test: Only the ten highest-revenue hours are listed
#[tokio::test]
async fn test_sales_top_hours_keeps_ten() {
    let services = TestServices::new();
    for hour in 0..12u32 {
        let order = paid_order(
            &format!("h{}", hour),
            Decimal::from(hour + 1),
            jan(10, hour),
            "loc-1",
        );
        add_paid(&services, order, PaymentMethod::Card).await;
    }

    let report = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Daily)
        .await
        .unwrap();

    assert_eq!(report.top_hours.len(), 10);
    assert_eq!(report.top_hours[0].hour, 11);
    assert_eq!(report.top_hours[0].revenue, 12.0);
    assert_eq!(report.top_hours[9].hour, 2);
    assert!(report.top_hours.iter().all(|h| h.hour >= 2));
}

/// Test: Reconciliation rates over orders, payments and transactions
#[tokio::test]
async fn test_sales_payment_reconciliation_rates() {
    let services = TestServices::new();
    for (id, amount) in [("a", dec!(10)), ("b", dec!(20)), ("c", dec!(30))] {
        add_paid(&services, paid_order(id, amount, jan(10, 12), "loc-1"), PaymentMethod::Card).await;
    }

    // Completed but never paid; two declined attempts
    let mut unpaid = paid_order("d", dec!(40), jan(10, 13), "loc-1");
    unpaid.payment = None;
    for attempt in 1..=2 {
        let mut tx = card_payment(&unpaid);
        tx.transaction_id = format!("tx-d-{}", attempt);
        tx.status = TransactionStatus::Failed;
        services.repo.add_transaction(TENANT, tx).await;
    }
    services.repo.add_order(TENANT, unpaid, vec![]).await;

    let mut void = paid_order("e", dec!(50), jan(10, 14), "loc-1");
    void.status = OrderStatus::Void;
    void.payment = None;
    services.repo.add_order(TENANT, void, vec![]).await;

    let report = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Daily)
        .await
        .unwrap();
    let rec = &report.payment_reconciliation;

    assert_eq!(rec.total_orders, 5);
    assert_eq!(rec.completed_orders, 4);
    assert_eq!(rec.order_completion_rate, 80.0);
    assert_eq!(rec.orders_with_payment, 3);
    assert_eq!(rec.payment_success_rate, 75.0);
    assert_eq!(rec.total_transactions, 5);
    assert_eq!(rec.successful_transactions, 3);
    assert_eq!(rec.transaction_success_rate, 60.0);
    assert_eq!(rec.order_totals_comparison.payment_total_collected, 60.0);
    assert_eq!(rec.order_totals_comparison.order_grand_total, 100.0);
    assert_eq!(rec.order_totals_comparison.difference, -40.0);
}

/// Test: Peak and slowest days break ties toward the earliest date
#[tokio::test]
async fn test_operations_peak_and_slowest_day_ties() {
    let services = TestServices::new();
    for (id, day) in [("a", 3), ("b", 3), ("c", 5), ("d", 5), ("e", 7), ("f", 9)] {
        let order = paid_order(id, dec!(10), jan(day, 12), "loc-1");
        services.repo.add_order(TENANT, order, vec![]).await;
    }

    let report = services
        .reports
        .operations()
        .generate_operations_report(&january())
        .await
        .unwrap();

    assert_eq!(report.daily_volume.len(), 4);
    let peak = report.peak_day.unwrap();
    assert_eq!(peak.date, "2024-01-03");
    assert_eq!(peak.orders, 2);
    let slowest = report.slowest_day.unwrap();
    assert_eq!(slowest.date, "2024-01-07");
    assert_eq!(slowest.orders, 1);
}

/// Test: Peak hours keep the top five by orders, then revenue, then hour
#[tokio::test]
async fn test_operations_peak_hours_cut_at_five() {
    let services = TestServices::new();
    let load: [(u32, u32, Decimal); 7] = [
        (8, 1, dec!(5)),
        (9, 3, dec!(5)),
        (10, 2, dec!(5)),
        (11, 2, dec!(10)),
        (12, 1, dec!(5)),
        (13, 4, dec!(5)),
        (14, 1, dec!(5)),
    ];
    for (hour, count, amount) in load {
        for n in 0..count {
            let order = paid_order(&format!("{}-{}", hour, n), amount, jan(10, hour), "loc-1");
            services.repo.add_order(TENANT, order, vec![]).await;
        }
    }

    let report = services
        .reports
        .operations()
        .generate_operations_report(&january())
        .await
        .unwrap();

    assert_eq!(report.hourly_patterns.len(), 7);
    let peak: Vec<u32> = report.peak_hours.iter().map(|h| h.hour).collect();
    assert_eq!(peak, vec![13, 9, 11, 10, 8]);
    assert_eq!(report.summary.busiest_hour, Some(13));
}

/// Test: Staff rows fall back to the username, and orders without a cashier are "Unassigned"
#[tokio::test]
async fn test_operations_staff_names() {
    let services = TestServices::new();
    services
        .repo
        .add_order(TENANT, paid_order("a", dec!(30), jan(10, 9), "loc-1"), vec![])
        .await;

    let mut nameless = paid_order("b", dec!(20), jan(10, 10), "loc-1");
    nameless.cashier = Some(CashierRef {
        id: "user-2".to_string(),
        username: "nightshift".to_string(),
        first_name: " ".to_string(),
        last_name: String::new(),
    });
    services.repo.add_order(TENANT, nameless, vec![]).await;

    let mut walk_in = paid_order("c", dec!(10), jan(10, 11), "loc-1");
    walk_in.cashier = None;
    services.repo.add_order(TENANT, walk_in, vec![]).await;

    let report = services
        .reports
        .operations()
        .generate_operations_report(&january())
        .await
        .unwrap();

    let rows: Vec<(Option<&str>, &str, f64)> = report
        .staff_performance
        .iter()
        .map(|s| (s.cashier_id.as_deref(), s.name.as_str(), s.revenue))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Some("user-1"), "Casey Till", 30.0),
            (Some("user-2"), "nightshift", 20.0),
            (None, "Unassigned", 10.0),
        ]
    );
    assert_eq!(report.summary.active_staff, 2);
}

/// Test: The trend granularity follows the range length unless overridden
#[tokio::test]
async fn test_products_trend_period_follows_range() {
    let services = TestServices::new();
    for (id, day) in [("a", 2), ("b", 3), ("c", 9)] {
        let order = paid_order(id, dec!(5), jan(day, 12), "loc-1");
        services
            .repo
            .add_order(TENANT, order, vec![line("p1", "Latte", 1, dec!(5))])
            .await;
    }
    let products = services.reports.products();

    let short = ReportRequest::new(TENANT, jan(1, 0), jan(6, 0));
    let report = products
        .generate_products_report(&short, Default::default())
        .await
        .unwrap();
    assert_eq!(report.trend_period, TrendPeriod::Daily);
    let points: Vec<&str> = report.product_trends[0].data.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(points, vec!["2024-01-02", "2024-01-03"]);

    let report = products
        .generate_products_report(&january(), Default::default())
        .await
        .unwrap();
    assert_eq!(report.trend_period, TrendPeriod::Weekly);
    let points: Vec<(&str, i64)> = report.product_trends[0]
        .data
        .iter()
        .map(|p| (p.period.as_str(), p.quantity))
        .collect();
    assert_eq!(points, vec![("2024-01-01", 2), ("2024-01-08", 1)]);

    let quarter = ReportRequest::new(TENANT, jan(1, 0), jan(1, 0) + chrono::Duration::days(90));
    let report = products
        .generate_products_report(&quarter, Default::default())
        .await
        .unwrap();
    assert_eq!(report.trend_period, TrendPeriod::Monthly);
    assert_eq!(report.product_trends[0].data.len(), 1);
    assert_eq!(report.product_trends[0].data[0].quantity, 3);

    let overridden = ProductReportOptions {
        trend_period: Some(TrendPeriod::Daily),
        ..Default::default()
    };
    let report = products
        .generate_products_report(&january(), overridden)
        .await
        .unwrap();
    assert_eq!(report.trend_period, TrendPeriod::Daily);
    assert_eq!(report.product_trends[0].data.len(), 3);
}

/// Test: Trends cover only the five best-selling products by revenue
#[tokio::test]
async fn test_products_trends_limited_to_five() {
    let services = TestServices::new();
    let lines: Vec<_> = (1..=7i64)
        .map(|n| line(&format!("p{}", n), &format!("Product {}", n), 1, Decimal::from(n * 10)))
        .collect();
    let order = paid_order("o1", dec!(280), jan(10, 9), "loc-1");
    services.repo.add_order(TENANT, order, lines).await;

    let options = ProductReportOptions {
        limit: 3,
        ..Default::default()
    };
    let report = services
        .reports
        .products()
        .generate_products_report(&january(), options)
        .await
        .unwrap();

    assert_eq!(report.top_by_revenue.len(), 3);
    assert_eq!(report.summary.products_sold, 7);
    let trended: Vec<&str> = report
        .product_trends
        .iter()
        .map(|t| t.product_id.as_str())
        .collect();
    assert_eq!(trended, vec!["p7", "p6", "p5", "p4", "p3"]);
}

/// Test: Generators bucket by the tenant's local calendar, not UTC
#[tokio::test]
async fn test_generators_bucket_in_local_time() {
    let services = TestServices::new();
    services.repo.set_timezone(TENANT, "Asia/Jakarta").await;
    // Sunday 2024-01-07 17:00 local
    add_paid(&services, paid_order("sun", dec!(10), jan(7, 10), "loc-1"), PaymentMethod::Card).await;
    // Monday 2024-01-08 03:00 local, still Sunday in UTC
    add_paid(&services, paid_order("mon", dec!(20), jan(7, 20), "loc-1"), PaymentMethod::Card).await;

    let sales = services
        .reports
        .sales()
        .generate_sales_report(&january(), TrendPeriod::Weekly)
        .await
        .unwrap();
    let weeks: Vec<(&str, f64)> = sales
        .sales_data
        .iter()
        .map(|p| (p.period.as_str(), p.revenue))
        .collect();
    assert_eq!(weeks, vec![("2024-01-01", 10.0), ("2024-01-08", 20.0)]);
    let mut hours: Vec<u32> = sales.top_hours.iter().map(|h| h.hour).collect();
    hours.sort_unstable();
    assert_eq!(hours, vec![3, 17]);

    let operations = services
        .reports
        .operations()
        .generate_operations_report(&january())
        .await
        .unwrap();
    let days: Vec<&str> = operations
        .daily_volume
        .iter()
        .map(|d| d.date.as_str())
        .collect();
    assert_eq!(days, vec!["2024-01-07", "2024-01-08"]);
}
