use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::timezone::TimezoneSource;
use crate::core::{AppError, Result};
use crate::modules::reports::models::{
    CashierRef, OrderFact, OrderLineFact, OrderStatus, OrderStatusCounts, PaymentMethod,
    PaymentTotals, ReportScope, StoreLocation, TransactionFact, TransactionStatus,
};

/// Read side of the transactional tables used by every report generator.
///
/// Every method is scoped by tenant, `[start, end)` on the order's `created_at`, and
/// the optional location. Rows come back normalised; aggregation happens in services.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Completed orders with a positive subtotal, one row per order
    async fn completed_orders(&self, scope: &ReportScope) -> Result<Vec<OrderFact>>;

    /// Line items belonging to the orders returned by `completed_orders`
    async fn order_lines(&self, scope: &ReportScope) -> Result<Vec<OrderLineFact>>;

    /// Payment transactions of completed orders, any transaction status
    async fn payment_transactions(&self, scope: &ReportScope) -> Result<Vec<TransactionFact>>;

    /// All orders in scope counted by status
    async fn order_status_counts(&self, scope: &ReportScope) -> Result<OrderStatusCounts>;

    /// Active store locations of a tenant
    async fn active_locations(&self, tenant_id: &str) -> Result<Vec<StoreLocation>>;

    async fn find_location(&self, tenant_id: &str, location_id: &str)
        -> Result<Option<StoreLocation>>;
}

pub struct MySqlReportRepository {
    pool: MySqlPool,
}

impl MySqlReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ReportRepository for MySqlReportRepository {
    async fn completed_orders(&self, scope: &ReportScope) -> Result<Vec<OrderFact>> {
        // Payments are pre-aggregated per order so the join never fans out
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT
                CAST(o.id AS CHAR) AS order_id,
                o.order_number,
                CAST(o.store_location_id AS CHAR) AS location_id,
                o.status,
                o.created_at,
                o.completed_at,
                o.subtotal,
                o.tax_total,
                o.discount_total,
                o.grand_total,
                CAST(u.id AS CHAR) AS cashier_id,
                u.username AS cashier_username,
                u.first_name AS cashier_first_name,
                u.last_name AS cashier_last_name,
                CAST(o.customer_id AS CHAR) AS customer_id,
                p.total_collected,
                p.total_tips,
                p.total_surcharges
            FROM orders o
            LEFT JOIN users u ON u.id = o.cashier_id
            LEFT JOIN (
                SELECT order_id,
                       SUM(total_collected) AS total_collected,
                       SUM(total_tips) AS total_tips,
                       SUM(total_surcharges) AS total_surcharges
                FROM payments
                GROUP BY order_id
            ) p ON p.order_id = o.id
            WHERE o.tenant_id = ?
              AND o.status = 'COMPLETED'
              AND o.subtotal > 0
              AND o.created_at >= ?
              AND o.created_at < ?
              AND (? IS NULL OR o.store_location_id = ?)
            ORDER BY o.created_at
            "#,
        )
        .bind(&scope.tenant_id)
        .bind(scope.start.naive_utc())
        .bind(scope.end.naive_utc())
        .bind(&scope.location_id)
        .bind(&scope.location_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderFact::try_from).collect()
    }

    async fn order_lines(&self, scope: &ReportScope) -> Result<Vec<OrderLineFact>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT
                CAST(o.id AS CHAR) AS order_id,
                o.created_at AS order_created_at,
                CAST(pr.id AS CHAR) AS product_id,
                pr.name AS product_name,
                c.name AS category_name,
                CAST(oi.quantity AS SIGNED) AS quantity,
                oi.price_at_sale
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products pr ON pr.id = oi.product_id
            LEFT JOIN categories c ON c.id = pr.category_id
            WHERE o.tenant_id = ?
              AND o.status = 'COMPLETED'
              AND o.subtotal > 0
              AND o.created_at >= ?
              AND o.created_at < ?
              AND (? IS NULL OR o.store_location_id = ?)
            ORDER BY o.created_at
            "#,
        )
        .bind(&scope.tenant_id)
        .bind(scope.start.naive_utc())
        .bind(scope.end.naive_utc())
        .bind(&scope.location_id)
        .bind(&scope.location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLineFact::from).collect())
    }

    async fn payment_transactions(&self, scope: &ReportScope) -> Result<Vec<TransactionFact>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT
                CAST(t.id AS CHAR) AS transaction_id,
                CAST(o.id AS CHAR) AS order_id,
                o.order_number,
                CAST(o.store_location_id AS CHAR) AS location_id,
                t.method,
                t.status,
                t.amount,
                t.tip,
                t.surcharge,
                t.refunded_amount,
                t.created_at
            FROM payment_transactions t
            JOIN payments p ON p.id = t.payment_id
            JOIN orders o ON o.id = p.order_id
            WHERE o.tenant_id = ?
              AND o.status = 'COMPLETED'
              AND o.subtotal > 0
              AND o.created_at >= ?
              AND o.created_at < ?
              AND (? IS NULL OR o.store_location_id = ?)
            ORDER BY t.created_at
            "#,
        )
        .bind(&scope.tenant_id)
        .bind(scope.start.naive_utc())
        .bind(scope.end.naive_utc())
        .bind(&scope.location_id)
        .bind(&scope.location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransactionFact::from).collect())
    }

    async fn order_status_counts(&self, scope: &ReportScope) -> Result<OrderStatusCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT o.status, CAST(COUNT(*) AS SIGNED) AS order_count
            FROM orders o
            WHERE o.tenant_id = ?
              AND o.created_at >= ?
              AND o.created_at < ?
              AND (? IS NULL OR o.store_location_id = ?)
            GROUP BY o.status
            "#,
        )
        .bind(&scope.tenant_id)
        .bind(scope.start.naive_utc())
        .bind(scope.end.naive_utc())
        .bind(&scope.location_id)
        .bind(&scope.location_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = OrderStatusCounts::default();
        for (status, count) in rows {
            match status.parse::<OrderStatus>() {
                Ok(status) => counts.add(status, count),
                // Unknown statuses still count towards the total
                Err(_) => counts.total += count,
            }
        }
        Ok(counts)
    }

    async fn active_locations(&self, tenant_id: &str) -> Result<Vec<StoreLocation>> {
        let rows: Vec<(String, String, bool)> = sqlx::query_as(
            r#"
            SELECT CAST(id AS CHAR), name, is_active
            FROM store_locations
            WHERE tenant_id = ? AND is_active = TRUE
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, is_active)| StoreLocation { id, name, is_active })
            .collect())
    }

    async fn find_location(
        &self,
        tenant_id: &str,
        location_id: &str,
    ) -> Result<Option<StoreLocation>> {
        let row: Option<(String, String, bool)> = sqlx::query_as(
            r#"
            SELECT CAST(id AS CHAR), name, is_active
            FROM store_locations
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, is_active)| StoreLocation { id, name, is_active }))
    }
}

#[async_trait]
impl TimezoneSource for MySqlReportRepository {
    async fn business_timezone(&self, tenant_id: &str) -> Result<Option<String>> {
        let timezone: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT timezone FROM business_settings WHERE tenant_id = ? LIMIT 1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(timezone.and_then(|(tz,)| tz).filter(|tz| !tz.trim().is_empty()))
    }
}

/// Database row for the completed-orders query
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    order_number: String,
    location_id: Option<String>,
    status: String,
    created_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
    subtotal: Decimal,
    tax_total: Decimal,
    discount_total: Decimal,
    grand_total: Decimal,
    cashier_id: Option<String>,
    cashier_username: Option<String>,
    cashier_first_name: Option<String>,
    cashier_last_name: Option<String>,
    customer_id: Option<String>,
    total_collected: Option<Decimal>,
    total_tips: Option<Decimal>,
    total_surcharges: Option<Decimal>,
}

impl TryFrom<OrderRow> for OrderFact {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(AppError::Internal)?;

        let cashier = row.cashier_id.map(|id| CashierRef {
            id,
            username: row.cashier_username.unwrap_or_default(),
            first_name: row.cashier_first_name.unwrap_or_default(),
            last_name: row.cashier_last_name.unwrap_or_default(),
        });

        // The aggregated payment columns are all NULL when the order has no payment
        let payment = row.total_collected.map(|total_collected| PaymentTotals {
            total_collected,
            total_tips: row.total_tips.unwrap_or_default(),
            total_surcharges: row.total_surcharges.unwrap_or_default(),
        });

        Ok(OrderFact {
            order_id: row.order_id,
            order_number: row.order_number,
            location_id: row.location_id,
            status,
            created_at: row.created_at.and_utc(),
            completed_at: row.completed_at.map(|ts| ts.and_utc()),
            subtotal: row.subtotal,
            tax_total: row.tax_total,
            discount_total: row.discount_total,
            grand_total: row.grand_total,
            cashier,
            customer_id: row.customer_id,
            payment,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    order_id: String,
    order_created_at: NaiveDateTime,
    product_id: String,
    product_name: String,
    category_name: Option<String>,
    quantity: i64,
    price_at_sale: Decimal,
}

impl From<OrderLineRow> for OrderLineFact {
    fn from(row: OrderLineRow) -> Self {
        OrderLineFact {
            order_id: row.order_id,
            order_created_at: row.order_created_at.and_utc(),
            product_id: row.product_id,
            product_name: row.product_name,
            category_name: row.category_name,
            quantity: row.quantity,
            price_at_sale: row.price_at_sale,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    transaction_id: String,
    order_id: String,
    order_number: String,
    location_id: Option<String>,
    method: String,
    status: String,
    amount: Decimal,
    tip: Option<Decimal>,
    surcharge: Option<Decimal>,
    refunded_amount: Option<Decimal>,
    created_at: NaiveDateTime,
}

impl From<TransactionRow> for TransactionFact {
    fn from(row: TransactionRow) -> Self {
        TransactionFact {
            transaction_id: row.transaction_id,
            order_id: row.order_id,
            order_number: row.order_number,
            location_id: row.location_id,
            method: PaymentMethod::from_db(&row.method),
            status: TransactionStatus::from_db(&row.status),
            amount: row.amount,
            tip: row.tip.unwrap_or_default(),
            surcharge: row.surcharge.unwrap_or_default(),
            refunded_amount: row.refunded_amount.unwrap_or_default(),
            created_at: row.created_at.and_utc(),
        }
    }
}
