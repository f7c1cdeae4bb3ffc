use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::exports::models::{ExportOperation, ExportPriority, ExportStatus};

#[derive(Default)]
struct QueueState {
    /// Pending operation ids, one FIFO per priority level
    levels: [VecDeque<Uuid>; 4],
    operations: HashMap<Uuid, ExportOperation>,
}

/// In-memory priority queue and status store for bulk exports.
///
/// Operations stay in the store after they finish so their status and artifact can
/// be polled by id, until `evict_finished` drops them.
#[derive(Default)]
pub struct ExportQueue {
    state: Mutex<QueueState>,
}

impl ExportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, operation: ExportOperation) -> Uuid {
        let id = operation.id;
        let mut state = self.state.lock().await;
        state.levels[operation.priority.level()].push_back(id);
        state.operations.insert(id, operation);
        id
    }

    /// Next operation id: highest priority first, FIFO within a priority.
    /// Ids whose operation is no longer queued are skipped.
    pub async fn dequeue(&self) -> Option<Uuid> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        for priority in ExportPriority::LEVELS {
            while let Some(id) = state.levels[priority.level()].pop_front() {
                let queued = state
                    .operations
                    .get(&id)
                    .map_or(false, |op| op.status == ExportStatus::Queued);
                if queued {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Operations still waiting to be processed
    pub async fn pending(&self) -> usize {
        let state = self.state.lock().await;
        state
            .levels
            .iter()
            .flatten()
            .filter(|id| {
                state
                    .operations
                    .get(*id)
                    .map_or(false, |op| op.status == ExportStatus::Queued)
            })
            .count()
    }

    /// Snapshot of an operation, visible only to the tenant that submitted it
    pub async fn get(&self, tenant_id: &str, id: Uuid) -> Option<ExportOperation> {
        let state = self.state.lock().await;
        state
            .operations
            .get(&id)
            .filter(|op| op.tenant_id == tenant_id)
            .cloned()
    }

    pub(crate) async fn snapshot(&self, id: Uuid) -> Option<ExportOperation> {
        self.state.lock().await.operations.get(&id).cloned()
    }

    /// Drop finished operations (and their artifacts) completed before `cutoff`.
    /// Queued and processing operations are never evicted.
    pub async fn evict_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.state.lock().await;
        let before = state.operations.len();
        state.operations.retain(|_, op| {
            !(op.status.is_terminal() && op.completed_at.map_or(false, |at| at < cutoff))
        });
        before - state.operations.len()
    }

    /// Apply a change to a stored operation
    pub async fn update<F>(&self, id: Uuid, change: F) -> Result<()>
    where
        F: FnOnce(&mut ExportOperation) -> Result<()>,
    {
        let mut state = self.state.lock().await;
        let operation = state
            .operations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Export operation {}", id)))?;
        change(operation)
    }
}
