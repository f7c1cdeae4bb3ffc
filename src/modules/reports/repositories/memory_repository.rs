use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::timezone::TimezoneSource;
use crate::core::{AppError, Result};
use crate::modules::reports::models::{
    OrderFact, OrderLineFact, OrderStatusCounts, ReportScope, StoreLocation, TransactionFact,
};

use super::report_repository::ReportRepository;

/// In-process report source for tests and single-node demos.
///
/// Applies the same filters as the MySQL queries and counts every call, so callers can
/// assert that a cache hit touched no data.
#[derive(Default)]
pub struct InMemoryReportRepository {
    tenants: RwLock<HashMap<String, TenantData>>,
    failing_locations: RwLock<HashSet<String>>,
    queries: AtomicUsize,
}

#[derive(Default)]
struct TenantData {
    orders: Vec<OrderFact>,
    lines: Vec<OrderLineFact>,
    transactions: Vec<TransactionFact>,
    locations: Vec<StoreLocation>,
    timezone: Option<String>,
}

impl TenantData {
    fn order_in_scope(&self, order_id: &str, scope: &ReportScope) -> bool {
        self.orders
            .iter()
            .any(|o| o.order_id == order_id && o.is_reportable() && in_scope(o, scope))
    }
}

fn in_scope(order: &OrderFact, scope: &ReportScope) -> bool {
    scope.contains(order.created_at)
        && scope
            .location_id
            .as_ref()
            .map_or(true, |loc| order.location_id.as_deref() == Some(loc.as_str()))
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an order with its line items. Line timestamps follow the order.
    pub async fn add_order(&self, tenant_id: &str, order: OrderFact, lines: Vec<OrderLineFact>) {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants.entry(tenant_id.to_string()).or_default();
        for mut line in lines {
            line.order_id = order.order_id.clone();
            line.order_created_at = order.created_at;
            tenant.lines.push(line);
        }
        tenant.orders.push(order);
    }

    pub async fn add_transaction(&self, tenant_id: &str, transaction: TransactionFact) {
        let mut tenants = self.tenants.write().await;
        tenants
            .entry(tenant_id.to_string())
            .or_default()
            .transactions
            .push(transaction);
    }

    pub async fn add_location(&self, tenant_id: &str, location: StoreLocation) {
        let mut tenants = self.tenants.write().await;
        tenants
            .entry(tenant_id.to_string())
            .or_default()
            .locations
            .push(location);
    }

    pub async fn set_timezone(&self, tenant_id: &str, timezone: &str) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant_id.to_string()).or_default().timezone = Some(timezone.to_string());
    }

    /// Make every query scoped to `location_id` fail
    pub async fn fail_location(&self, location_id: &str) {
        self.failing_locations
            .write()
            .await
            .insert(location_id.to_string());
    }

    /// Number of repository calls made so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    async fn begin_query(&self, scope: &ReportScope) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(location_id) = &scope.location_id {
            if self.failing_locations.read().await.contains(location_id) {
                return Err(AppError::internal(format!(
                    "Simulated failure for location {}",
                    location_id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn completed_orders(&self, scope: &ReportScope) -> Result<Vec<OrderFact>> {
        self.begin_query(scope).await?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&scope.tenant_id)
            .map(|t| {
                t.orders
                    .iter()
                    .filter(|o| o.is_reportable() && in_scope(o, scope))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn order_lines(&self, scope: &ReportScope) -> Result<Vec<OrderLineFact>> {
        self.begin_query(scope).await?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&scope.tenant_id)
            .map(|t| {
                t.lines
                    .iter()
                    .filter(|l| t.order_in_scope(&l.order_id, scope))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn payment_transactions(&self, scope: &ReportScope) -> Result<Vec<TransactionFact>> {
        self.begin_query(scope).await?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&scope.tenant_id)
            .map(|t| {
                t.transactions
                    .iter()
                    .filter(|tx| t.order_in_scope(&tx.order_id, scope))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn order_status_counts(&self, scope: &ReportScope) -> Result<OrderStatusCounts> {
        self.begin_query(scope).await?;
        let tenants = self.tenants.read().await;
        let mut counts = OrderStatusCounts::default();
        if let Some(tenant) = tenants.get(&scope.tenant_id) {
            for order in tenant.orders.iter().filter(|o| in_scope(o, scope)) {
                counts.add(order.status, 1);
            }
        }
        Ok(counts)
    }

    async fn active_locations(&self, tenant_id: &str) -> Result<Vec<StoreLocation>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(tenant_id)
            .map(|t| t.locations.iter().filter(|l| l.is_active).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_location(
        &self,
        tenant_id: &str,
        location_id: &str,
    ) -> Result<Option<StoreLocation>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(tenant_id)
            .and_then(|t| t.locations.iter().find(|l| l.id == location_id).cloned()))
    }
}

#[async_trait]
impl TimezoneSource for InMemoryReportRepository {
    async fn business_timezone(&self, tenant_id: &str) -> Result<Option<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_id).and_then(|t| t.timezone.clone()))
    }
}
