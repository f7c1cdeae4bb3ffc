// Test Data Factory
//
// Builders for the normalised order, line and transaction records the report
// generators consume. Amounts are given in whole currency units.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tillreports::modules::reports::models::{
    CashierRef, OrderFact, OrderLineFact, OrderStatus, PaymentMethod, PaymentTotals,
    StoreLocation, TransactionFact, TransactionStatus,
};

pub const TENANT: &str = "tenant-test";

/// UTC timestamp in January 2024
pub fn jan(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

pub fn cashier() -> CashierRef {
    CashierRef {
        id: "user-1".to_string(),
        username: "cashier1".to_string(),
        first_name: "Casey".to_string(),
        last_name: "Till".to_string(),
    }
}

/// Completed, fully paid order in `location_id`
pub fn paid_order(id: &str, amount: Decimal, created_at: DateTime<Utc>, location_id: &str) -> OrderFact {
    OrderFact {
        order_id: id.to_string(),
        order_number: format!("ORD-{}", id),
        location_id: Some(location_id.to_string()),
        status: OrderStatus::Completed,
        created_at,
        completed_at: Some(created_at),
        subtotal: amount,
        tax_total: Decimal::ZERO,
        discount_total: Decimal::ZERO,
        grand_total: amount,
        cashier: Some(cashier()),
        customer_id: None,
        payment: Some(PaymentTotals {
            total_collected: amount,
            total_tips: Decimal::ZERO,
            total_surcharges: Decimal::ZERO,
        }),
    }
}

pub fn line(product_id: &str, name: &str, quantity: i64, price: Decimal) -> OrderLineFact {
    OrderLineFact {
        order_id: String::new(),
        order_created_at: Utc::now(),
        product_id: product_id.to_string(),
        product_name: name.to_string(),
        category_name: Some("Drinks".to_string()),
        quantity,
        price_at_sale: price,
    }
}

/// Successful card transaction settling `order`
pub fn card_payment(order: &OrderFact) -> TransactionFact {
    TransactionFact {
        transaction_id: format!("tx-{}", order.order_id),
        order_id: order.order_id.clone(),
        order_number: order.order_number.clone(),
        location_id: order.location_id.clone(),
        method: PaymentMethod::Card,
        status: TransactionStatus::Successful,
        amount: order.grand_total,
        tip: Decimal::ZERO,
        surcharge: Decimal::ZERO,
        refunded_amount: Decimal::ZERO,
        created_at: order.created_at,
    }
}

pub fn location(id: &str, name: &str) -> StoreLocation {
    StoreLocation {
        id: id.to_string(),
        name: name.to_string(),
        is_active: true,
    }
}
