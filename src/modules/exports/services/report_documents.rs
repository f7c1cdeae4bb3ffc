//! Lowering of each report type into an `ExportDocument`.

use crate::core::currency::money;
use crate::modules::exports::models::{Cell, ExportDocument, Section};
use crate::modules::reports::models::{
    OperationsReport, OrderFact, OrderTotalsComparison, PaymentsReport, ProductsReport, ReportType,
    SalesReport, SummaryReport, TransactionFact,
};
use crate::modules::reports::models::products::ProductPerformance;
use crate::modules::reports::models::operations::HourlyPattern;

/// Rows printed in the PDF for per-order and per-transaction detail sections
pub const PDF_DETAIL_LIMIT: usize = 50;

/// Rows printed in the PDF for product rankings
pub const PDF_PRODUCT_LIMIT: usize = 100;

/// Transactional rows re-read for the Sales and Payments detail sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDetails {
    pub orders: Vec<OrderFact>,
    pub transactions: Vec<TransactionFact>,
}

fn hour_label(hour: u32) -> Cell {
    Cell::Text(format!("{:02}:00", hour))
}

fn timestamp(value: chrono::DateTime<chrono::Utc>) -> Cell {
    Cell::Text(value.format("%Y-%m-%d %H:%M").to_string())
}

fn comparison_section(comparison: &OrderTotalsComparison) -> Section {
    Section::key_values(
        "Order Totals Comparison",
        vec![
            ("Payment Total Collected", Cell::Currency(comparison.payment_total_collected)),
            ("Order Grand Total", Cell::Currency(comparison.order_grand_total)),
            ("Difference", Cell::Currency(comparison.difference)),
        ],
    )
}

pub fn summary_document(report: &SummaryReport) -> ExportDocument {
    let mut doc = ExportDocument::new(ReportType::Summary.title(), &report.metadata);

    doc.push(Section::key_values(
        "Key Metrics",
        vec![
            ("Total Sales", Cell::Currency(report.total_sales)),
            ("Total Transactions", Cell::Integer(report.total_transactions)),
            ("Average Ticket", Cell::Currency(report.average_ticket)),
            ("Total Tax", Cell::Currency(report.total_tax)),
            ("Total Discounts", Cell::Currency(report.total_discounts)),
            ("Total Tips", Cell::Currency(report.total_tips)),
            ("Total Items", Cell::Integer(report.total_items)),
            ("Sales Growth", Cell::Percent(report.sales_growth)),
            ("Transaction Growth", Cell::Percent(report.transaction_growth)),
        ],
    ));
    doc.push(comparison_section(&report.order_totals_comparison));

    let mut trend = Section::new("Sales Trend", &["Date", "Sales", "Transactions"]);
    for point in &report.sales_trend {
        trend.push(vec![
            Cell::text(&point.date),
            Cell::Currency(point.sales),
            Cell::Integer(point.transactions),
        ]);
    }
    doc.push(trend);

    let mut payments = Section::new(
        "Payment Distribution",
        &["Method", "Amount", "Count", "Percentage"],
    );
    for share in &report.payment_distribution {
        payments.push(vec![
            Cell::text(&share.method),
            Cell::Currency(share.amount),
            Cell::Integer(share.count),
            Cell::Percent(share.percentage),
        ]);
    }
    doc.push(payments);

    let mut hourly = Section::new("Hourly Performance", &["Hour", "Sales", "Transactions"]);
    for hour in &report.hourly_performance {
        hourly.push(vec![
            hour_label(hour.hour),
            Cell::Currency(hour.sales),
            Cell::Integer(hour.transactions),
        ]);
    }
    doc.push(hourly);

    let mut products = Section::new("Top Products", &["Product", "Quantity", "Revenue"]);
    for product in &report.top_products {
        products.push(vec![
            Cell::text(&product.name),
            Cell::Integer(product.quantity),
            Cell::Currency(product.revenue),
        ]);
    }
    doc.push(products);

    doc
}

pub fn sales_document(report: &SalesReport, orders: &[OrderFact]) -> ExportDocument {
    let mut doc = ExportDocument::new(ReportType::Sales.title(), &report.metadata);
    let summary = &report.summary;

    doc.push(Section::key_values(
        "Sales Summary",
        vec![
            ("Total Revenue", Cell::Currency(summary.total_revenue)),
            ("Total Orders", Cell::Integer(summary.total_orders)),
            ("Total Items", Cell::Integer(summary.total_items)),
            ("Average Order Value", Cell::Currency(summary.average_order_value)),
            ("Total Tax", Cell::Currency(summary.total_tax)),
            ("Total Discounts", Cell::Currency(summary.total_discounts)),
            ("Total Tips", Cell::Currency(summary.total_tips)),
            ("Revenue Growth", Cell::Percent(summary.revenue_growth)),
            ("Order Growth", Cell::Percent(summary.order_growth)),
        ],
    ));

    let mut periods = Section::new(
        format!("Sales by Period ({})", report.group_by),
        &["Period", "Revenue", "Orders", "Items"],
    );
    let mut methods = Section::new(
        "Payment Methods by Period",
        &["Period", "Method", "Amount", "Transactions"],
    );
    for period in &report.sales_data {
        periods.push(vec![
            Cell::text(&period.period),
            Cell::Currency(period.revenue),
            Cell::Integer(period.orders),
            Cell::Integer(period.items),
        ]);
        for method in &period.payment_methods {
            methods.push(vec![
                Cell::text(&period.period),
                Cell::text(&method.method),
                Cell::Currency(method.amount),
                Cell::Integer(method.count),
            ]);
        }
    }
    doc.push(periods);
    doc.push(methods);

    let mut categories = Section::new(
        "Category Breakdown",
        &["Category", "Revenue", "Quantity", "Percentage"],
    );
    for category in &report.category_breakdown {
        categories.push(vec![
            Cell::text(&category.category),
            Cell::Currency(category.revenue),
            Cell::Integer(category.quantity),
            Cell::Percent(category.percentage),
        ]);
    }
    doc.push(categories);

    let mut hours = Section::new("Top Hours", &["Hour", "Revenue", "Orders"]);
    for hour in &report.top_hours {
        hours.push(vec![
            hour_label(hour.hour),
            Cell::Currency(hour.revenue),
            Cell::Integer(hour.orders),
        ]);
    }
    doc.push(hours);

    let recon = &report.payment_reconciliation;
    doc.push(Section::key_values(
        "Payment Reconciliation",
        vec![
            ("Total Orders", Cell::Integer(recon.total_orders)),
            ("Completed Orders", Cell::Integer(recon.completed_orders)),
            ("Order Completion Rate", Cell::Percent(recon.order_completion_rate)),
            ("Orders With Payment", Cell::Integer(recon.orders_with_payment)),
            ("Payment Success Rate", Cell::Percent(recon.payment_success_rate)),
            ("Total Transactions", Cell::Integer(recon.total_transactions)),
            ("Successful Transactions", Cell::Integer(recon.successful_transactions)),
            ("Transaction Success Rate", Cell::Percent(recon.transaction_success_rate)),
        ],
    ));
    doc.push(comparison_section(&recon.order_totals_comparison));

    let mut ranked: Vec<&OrderFact> = orders.iter().collect();
    ranked.sort_by(|a, b| {
        b.collected()
            .cmp(&a.collected())
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    let mut details = Section::new(
        "Order Details",
        &[
            "Order Number",
            "Created (UTC)",
            "Cashier",
            "Subtotal",
            "Tax",
            "Discount",
            "Grand Total",
            "Collected",
        ],
    )
    .with_pdf_limit(PDF_DETAIL_LIMIT);
    for order in ranked {
        details.push(vec![
            Cell::text(&order.order_number),
            timestamp(order.created_at),
            Cell::from(order.cashier.as_ref().map(|c| c.display_name())),
            Cell::Currency(money(order.subtotal)),
            Cell::Currency(money(order.tax_total)),
            Cell::Currency(money(order.discount_total)),
            Cell::Currency(money(order.grand_total)),
            Cell::Currency(money(order.collected())),
        ]);
    }
    doc.push(details);

    doc
}

fn product_ranking(title: &str, products: &[ProductPerformance]) -> Section {
    let mut section = Section::new(
        title,
        &[
            "Product",
            "Category",
            "Quantity",
            "Revenue",
            "Orders",
            "Average Price",
            "Revenue Share",
        ],
    )
    .with_pdf_limit(PDF_PRODUCT_LIMIT);
    for product in products {
        section.push(vec![
            Cell::text(&product.name),
            Cell::text(&product.category),
            Cell::Integer(product.quantity),
            Cell::Currency(product.revenue),
            Cell::Integer(product.order_count),
            Cell::Currency(product.average_price),
            Cell::Percent(product.revenue_share),
        ]);
    }
    section
}

pub fn products_document(report: &ProductsReport) -> ExportDocument {
    let mut doc = ExportDocument::new(ReportType::Products.title(), &report.metadata);
    let summary = &report.summary;

    doc.push(Section::key_values(
        "Products Summary",
        vec![
            ("Products Sold", Cell::Integer(summary.products_sold)),
            ("Total Quantity", Cell::Integer(summary.total_quantity)),
            ("Total Revenue", Cell::Currency(summary.total_revenue)),
            ("Average Price", Cell::Currency(summary.average_price)),
            ("Categories", Cell::Integer(summary.category_count)),
        ],
    ));
    doc.push(product_ranking("Top Products by Revenue", &report.top_by_revenue));
    doc.push(product_ranking("Top Products by Quantity", &report.top_by_quantity));

    let mut categories = Section::new(
        "Category Performance",
        &["Category", "Revenue", "Quantity", "Products", "Percentage"],
    );
    for category in &report.category_performance {
        categories.push(vec![
            Cell::text(&category.category),
            Cell::Currency(category.revenue),
            Cell::Integer(category.quantity),
            Cell::Integer(category.product_count),
            Cell::Percent(category.percentage),
        ]);
    }
    doc.push(categories);

    let mut trends = Section::new(
        format!("Product Trends ({})", report.trend_period),
        &["Product", "Period", "Quantity", "Revenue"],
    );
    for trend in &report.product_trends {
        for point in &trend.data {
            trends.push(vec![
                Cell::text(&trend.name),
                Cell::text(&point.period),
                Cell::Integer(point.quantity),
                Cell::Currency(point.revenue),
            ]);
        }
    }
    doc.push(trends);

    doc
}

pub fn payments_document(report: &PaymentsReport, transactions: &[TransactionFact]) -> ExportDocument {
    let mut doc = ExportDocument::new(ReportType::Payments.title(), &report.metadata);
    let summary = &report.summary;

    doc.push(Section::key_values(
        "Payments Summary",
        vec![
            ("Total Revenue", Cell::Currency(summary.total_revenue)),
            ("Total Transactions", Cell::Integer(summary.total_transactions)),
            ("Successful Transactions", Cell::Integer(summary.successful_transactions)),
            ("Failed Transactions", Cell::Integer(summary.failed_transactions)),
            ("Refunded Transactions", Cell::Integer(summary.refunded_transactions)),
            ("Canceled Transactions", Cell::Integer(summary.canceled_transactions)),
            ("Success Rate", Cell::Percent(summary.success_rate)),
            ("Total Processed", Cell::Currency(summary.total_processed)),
            ("Total Tips", Cell::Currency(summary.total_tips)),
            ("Total Surcharges", Cell::Currency(summary.total_surcharges)),
            ("Processing Fees", Cell::Currency(summary.total_processing_fees)),
            ("Total Refunded", Cell::Currency(summary.total_refunded)),
            ("Net Revenue", Cell::Currency(summary.net_revenue)),
        ],
    ));

    let mut methods = Section::new(
        "Payment Methods",
        &[
            "Method",
            "Amount",
            "Count",
            "Average",
            "Processing Fees",
            "Refunded",
            "Refunds",
            "Net",
            "Share",
        ],
    );
    for method in &report.payment_methods {
        methods.push(vec![
            Cell::text(&method.method),
            Cell::Currency(method.amount),
            Cell::Integer(method.count),
            Cell::Currency(method.average_amount),
            Cell::Currency(method.processing_fees),
            Cell::Currency(method.refunded_amount),
            Cell::Integer(method.refund_count),
            Cell::Currency(method.net_amount),
            Cell::Percent(method.percentage),
        ]);
    }
    doc.push(methods);

    let mut daily = Section::new("Daily Volume", &["Date", "Amount", "Count"]);
    for day in &report.daily_volume {
        daily.push(vec![
            Cell::text(&day.date),
            Cell::Currency(day.amount),
            Cell::Integer(day.count),
        ]);
    }
    doc.push(daily);

    let mut breakdown = Section::new(
        "Daily Method Breakdown",
        &["Date", "Method", "Amount", "Count"],
    );
    for day in &report.daily_breakdown {
        for method in &day.methods {
            breakdown.push(vec![
                Cell::text(&day.date),
                Cell::text(&method.method),
                Cell::Currency(method.amount),
                Cell::Integer(method.count),
            ]);
        }
    }
    doc.push(breakdown);
    doc.push(comparison_section(&report.order_totals_comparison));

    if !report.location_breakdown.is_empty() {
        let mut locations = Section::new(
            "Location Breakdown",
            &["Location", "Revenue", "Processed", "Transactions", "Success Rate"],
        );
        for location in &report.location_breakdown {
            locations.push(vec![
                Cell::text(&location.location_name),
                Cell::Currency(location.total_revenue),
                Cell::Currency(location.total_processed),
                Cell::Integer(location.total_transactions),
                Cell::Percent(location.success_rate),
            ]);
        }
        doc.push(locations);
    }

    let mut ranked: Vec<&TransactionFact> = transactions.iter().collect();
    ranked.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    let mut details = Section::new(
        "Transaction Details",
        &[
            "Transaction",
            "Order Number",
            "Method",
            "Status",
            "Amount",
            "Tip",
            "Surcharge",
            "Refunded",
            "Created (UTC)",
        ],
    )
    .with_pdf_limit(PDF_DETAIL_LIMIT);
    for txn in ranked {
        details.push(vec![
            Cell::text(&txn.transaction_id),
            Cell::text(&txn.order_number),
            Cell::text(txn.method.as_str()),
            Cell::text(txn.status.as_str()),
            Cell::Currency(money(txn.amount)),
            Cell::Currency(money(txn.tip)),
            Cell::Currency(money(txn.surcharge)),
            Cell::Currency(money(txn.refunded_amount)),
            timestamp(txn.created_at),
        ]);
    }
    doc.push(details);

    doc
}

fn hourly_rows(title: &str, hours: &[HourlyPattern]) -> Section {
    let mut section = Section::new(title, &["Hour", "Orders", "Revenue", "Average Order Value"]);
    for hour in hours {
        section.push(vec![
            hour_label(hour.hour),
            Cell::Integer(hour.orders),
            Cell::Currency(hour.revenue),
            Cell::Currency(hour.average_order_value),
        ]);
    }
    section
}

pub fn operations_document(report: &OperationsReport) -> ExportDocument {
    let mut doc = ExportDocument::new(ReportType::Operations.title(), &report.metadata);
    let summary = &report.summary;

    doc.push(Section::key_values(
        "Operations Summary",
        vec![
            ("Total Orders", Cell::Integer(summary.total_orders)),
            ("Total Revenue", Cell::Currency(summary.total_revenue)),
            ("Average Order Value", Cell::Currency(summary.average_order_value)),
            (
                "Busiest Hour",
                summary.busiest_hour.map(hour_label).unwrap_or(Cell::Empty),
            ),
            ("Active Staff", Cell::Integer(summary.active_staff)),
            (
                "Average Daily Orders",
                Cell::Text(format!("{:.2}", summary.average_daily_orders)),
            ),
        ],
    ));
    doc.push(hourly_rows("Hourly Patterns", &report.hourly_patterns));
    doc.push(hourly_rows("Peak Hours", &report.peak_hours));

    let mut daily = Section::new("Daily Volume", &["Date", "Orders", "Revenue"]);
    for day in &report.daily_volume {
        daily.push(vec![
            Cell::text(&day.date),
            Cell::Integer(day.orders),
            Cell::Currency(day.revenue),
        ]);
    }
    doc.push(daily);

    let mut extremes = Section::new("Peak and Slowest Days", &["Day", "Date", "Orders", "Revenue"]);
    for (label, day) in [("Peak", &report.peak_day), ("Slowest", &report.slowest_day)] {
        if let Some(day) = day {
            extremes.push(vec![
                Cell::text(label),
                Cell::text(&day.date),
                Cell::Integer(day.orders),
                Cell::Currency(day.revenue),
            ]);
        }
    }
    doc.push(extremes);

    let mut staff = Section::new(
        "Staff Performance",
        &["Staff", "Orders", "Revenue", "Average Order Value"],
    );
    for member in &report.staff_performance {
        staff.push(vec![
            Cell::text(&member.name),
            Cell::Integer(member.orders),
            Cell::Currency(member.revenue),
            Cell::Currency(member.average_order_value),
        ]);
    }
    doc.push(staff);

    doc
}
