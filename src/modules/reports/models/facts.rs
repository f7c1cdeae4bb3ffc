//! Normalised records read from the transactional tables.
//!
//! Rows are converted into these plain structs once, at the repository boundary,
//! so aggregation code never has to care where a row came from.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Hold,
    Completed,
    Void,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Hold => "HOLD",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Void => "VOID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "HOLD" => Ok(OrderStatus::Hold),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "VOID" => Ok(OrderStatus::Void),
            "CANCELLED" | "CANCELED" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

/// Tender type of a payment transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    GiftCard,
    Mobile,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::GiftCard => "GIFT_CARD",
            PaymentMethod::Mobile => "MOBILE",
            PaymentMethod::Other => "OTHER",
        }
    }

    /// Processor fee charged on processed volume for this tender
    pub fn processing_fee_rate(&self) -> Decimal {
        match self {
            PaymentMethod::Card => Decimal::new(29, 3),
            PaymentMethod::Mobile => Decimal::new(25, 3),
            PaymentMethod::Cash | PaymentMethod::GiftCard | PaymentMethod::Other => Decimal::ZERO,
        }
    }

    /// Lenient conversion for values read from the database
    pub fn from_db(value: &str) -> Self {
        value.parse().unwrap_or(PaymentMethod::Other)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" | "CREDIT" | "DEBIT" => Ok(PaymentMethod::Card),
            "GIFT_CARD" => Ok(PaymentMethod::GiftCard),
            "MOBILE" | "WALLET" => Ok(PaymentMethod::Mobile),
            "OTHER" => Ok(PaymentMethod::Other),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Outcome of a payment transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
    Refunded,
    PartiallyRefunded,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Successful => "SUCCESSFUL",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Refunded => "REFUNDED",
            TransactionStatus::PartiallyRefunded => "PARTIALLY_REFUNDED",
            TransactionStatus::Canceled => "CANCELED",
        }
    }

    /// Money changed hands at some point (refunds are tracked separately)
    pub fn is_processed(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Successful
                | TransactionStatus::Refunded
                | TransactionStatus::PartiallyRefunded
        )
    }

    pub fn is_refund(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Refunded | TransactionStatus::PartiallyRefunded
        )
    }

    pub fn from_db(value: &str) -> Self {
        value.parse().unwrap_or(TransactionStatus::Pending)
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "SUCCESSFUL" | "SUCCESS" => Ok(TransactionStatus::Successful),
            "FAILED" => Ok(TransactionStatus::Failed),
            "REFUNDED" => Ok(TransactionStatus::Refunded),
            "PARTIALLY_REFUNDED" => Ok(TransactionStatus::PartiallyRefunded),
            "CANCELED" | "CANCELLED" => Ok(TransactionStatus::Canceled),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Staff member who rang up an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashierRef {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl CashierRef {
    /// "First Last", or the username when both names are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Payment totals for an order (summed if an order has several payment rows)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub total_collected: Decimal,
    pub total_tips: Decimal,
    pub total_surcharges: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFact {
    pub order_id: String,
    pub order_number: String,
    pub location_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub discount_total: Decimal,
    pub grand_total: Decimal,
    pub cashier: Option<CashierRef>,
    pub customer_id: Option<String>,
    pub payment: Option<PaymentTotals>,
}

impl OrderFact {
    /// Whether the order feeds revenue reports
    pub fn is_reportable(&self) -> bool {
        self.status == OrderStatus::Completed && self.subtotal > Decimal::ZERO
    }

    /// Money actually received for the order (zero without a payment)
    pub fn collected(&self) -> Decimal {
        self.payment
            .as_ref()
            .map(|p| p.total_collected)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn tips(&self) -> Decimal {
        self.payment
            .as_ref()
            .map(|p| p.total_tips)
            .unwrap_or(Decimal::ZERO)
    }
}

/// One line item, carrying the parent order's timestamp for bucketing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineFact {
    pub order_id: String,
    pub order_created_at: DateTime<Utc>,
    pub product_id: String,
    pub product_name: String,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub price_at_sale: Decimal,
}

impl OrderLineFact {
    pub fn revenue(&self) -> Decimal {
        Decimal::from(self.quantity) * self.price_at_sale
    }

    pub fn category(&self) -> &str {
        self.category_name.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFact {
    pub transaction_id: String,
    pub order_id: String,
    pub order_number: String,
    pub location_id: Option<String>,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub tip: Decimal,
    pub surcharge: Decimal,
    pub refunded_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Order counts by status, used for completion rates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusCounts {
    pub total: i64,
    pub completed: i64,
    pub void: i64,
    pub cancelled: i64,
}

impl OrderStatusCounts {
    pub fn add(&mut self, status: OrderStatus, count: i64) {
        self.total += count;
        match status {
            OrderStatus::Completed => self.completed += count,
            OrderStatus::Void => self.void += count,
            OrderStatus::Cancelled => self.cancelled += count,
            OrderStatus::Pending | OrderStatus::Hold => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

/// Tenant + half-open time window `[start, end)` + optional location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportScope {
    pub tenant_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location_id: Option<String>,
}

impl ReportScope {
    pub fn new(
        tenant_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location_id: Option<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            start,
            end,
            location_id,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The immediately preceding window of equal length
    pub fn previous_period(&self) -> Self {
        let length = self.duration();
        Self {
            tenant_id: self.tenant_id.clone(),
            start: self.start - length,
            end: self.start,
            location_id: self.location_id.clone(),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    pub fn with_location(&self, location_id: Option<String>) -> Self {
        Self {
            location_id,
            ..self.clone()
        }
    }
}
