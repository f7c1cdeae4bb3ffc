use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::error;

use crate::modules::reports::models::ReportType;

use super::cache_service::ReportCacheService;

/// Transactional entities whose writes make cached reports stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Order,
    PaymentTransaction,
    Product,
    InventoryStock,
}

impl EntityKind {
    /// Report types a write to this entity can change
    pub fn affected_reports(&self) -> &'static [ReportType] {
        match self {
            EntityKind::Order => &[
                ReportType::Summary,
                ReportType::Sales,
                ReportType::Operations,
            ],
            EntityKind::PaymentTransaction => &[
                ReportType::Payments,
                ReportType::Summary,
                ReportType::Sales,
            ],
            EntityKind::Product | EntityKind::InventoryStock => &[ReportType::Products],
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "order" => Ok(EntityKind::Order),
            "payment_transaction" | "payment" => Ok(EntityKind::PaymentTransaction),
            "product" => Ok(EntityKind::Product),
            "inventory_stock" | "inventory" => Ok(EntityKind::InventoryStock),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// Reacts to entity writes by dropping the tenant's affected report types.
///
/// Invalidation is by report type, never by individual key.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: ReportCacheService,
}

impl CacheInvalidator {
    pub fn new(cache: ReportCacheService) -> Self {
        Self { cache }
    }

    /// Returns the number of cache rows removed; failures are logged and count as 0
    pub async fn on_entity_changed(&self, tenant_id: &str, entity: EntityKind) -> u64 {
        match self
            .cache
            .invalidate_report_types(Some(tenant_id), entity.affected_reports())
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                error!(
                    tenant_id = %tenant_id,
                    entity = ?entity,
                    error = %e,
                    "Failed to invalidate report cache"
                );
                0
            }
        }
    }
}
