//! Shared aggregation passes over normalised facts.
//!
//! Order-level totals and line-level totals are always computed from separate inputs;
//! summing order fields over joined line rows would count each order once per item.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;

use crate::core::currency::{money, safe_div};
use crate::modules::reports::models::{
    OrderFact, OrderLineFact, OrderTotalsComparison, ProductSales,
};

/// Order-level sums over completed orders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderTotals {
    /// Sum of `Payment.total_collected`
    pub revenue: Decimal,
    pub orders: i64,
    pub tax: Decimal,
    pub discounts: Decimal,
    pub tips: Decimal,
    pub surcharges: Decimal,
    pub grand_total: Decimal,
    pub orders_with_payment: i64,
}

impl OrderTotals {
    pub fn from_orders(orders: &[OrderFact]) -> Self {
        orders.iter().fold(OrderTotals::default(), |mut acc, order| {
            acc.add(order);
            acc
        })
    }

    pub fn add(&mut self, order: &OrderFact) {
        self.orders += 1;
        self.tax += order.tax_total;
        self.discounts += order.discount_total;
        self.grand_total += order.grand_total;
        if let Some(payment) = &order.payment {
            self.revenue += payment.total_collected;
            self.tips += payment.total_tips;
            self.surcharges += payment.total_surcharges;
            self.orders_with_payment += 1;
        }
    }

    pub fn average_order_value(&self) -> Decimal {
        safe_div(self.revenue, Decimal::from(self.orders))
    }

    pub fn comparison(&self) -> OrderTotalsComparison {
        order_totals_comparison(self.revenue, self.grand_total)
    }
}

pub fn order_totals_comparison(collected: Decimal, grand_total: Decimal) -> OrderTotalsComparison {
    OrderTotalsComparison {
        payment_total_collected: money(collected),
        order_grand_total: money(grand_total),
        difference: money(collected - grand_total),
    }
}

/// Total quantity sold, from the line-level pass only
pub fn total_items(lines: &[OrderLineFact]) -> i64 {
    lines.iter().map(|l| l.quantity).sum()
}

/// Per-product line totals
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTotals {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: Decimal,
    pub order_ids: HashSet<String>,
}

impl ProductTotals {
    pub fn to_sales(&self) -> ProductSales {
        ProductSales {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            quantity: self.quantity,
            revenue: money(self.revenue),
        }
    }
}

pub fn product_totals(lines: &[OrderLineFact]) -> Vec<ProductTotals> {
    let mut by_product: HashMap<&str, ProductTotals> = HashMap::new();
    for line in lines {
        let entry = by_product
            .entry(line.product_id.as_str())
            .or_insert_with(|| ProductTotals {
                product_id: line.product_id.clone(),
                name: line.product_name.clone(),
                category: line.category().to_string(),
                quantity: 0,
                revenue: Decimal::ZERO,
                order_ids: HashSet::new(),
            });
        entry.quantity += line.quantity;
        entry.revenue += line.revenue();
        entry.order_ids.insert(line.order_id.clone());
    }
    by_product.into_values().collect()
}

/// Highest revenue first; ties broken by name then id so output is stable
pub fn sort_by_revenue(products: &mut [ProductTotals]) {
    products.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

pub fn sort_by_quantity(products: &mut [ProductTotals]) {
    products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
}

/// Top `limit` products by line revenue
pub fn top_products(lines: &[OrderLineFact], limit: usize) -> Vec<ProductSales> {
    let mut products = product_totals(lines);
    sort_by_revenue(&mut products);
    products.iter().take(limit).map(ProductTotals::to_sales).collect()
}

/// Per-category line totals keyed by category name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    pub revenue: Decimal,
    pub quantity: i64,
    pub products: HashSet<String>,
}

pub fn category_totals(lines: &[OrderLineFact]) -> BTreeMap<String, CategoryTotals> {
    let mut categories: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for line in lines {
        let entry = categories.entry(line.category().to_string()).or_default();
        entry.revenue += line.revenue();
        entry.quantity += line.quantity;
        entry.products.insert(line.product_id.clone());
    }
    categories
}
