use crate::core::snapshot::ExchangeSnapshot;
use crate::core::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory snapshot store; contents are lost when the process exits.
pub struct MemorySnapshotStore {
    inner: RwLock<Option<ExchangeSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self) -> Result<Option<ExchangeSnapshot>, StoreError> {
        let snapshot = self.inner.read().await.clone();
        if snapshot.is_some() {
            debug!("Snapshot HIT");
        } else {
            debug!("Snapshot MISS");
        }
        Ok(snapshot)
    }

    async fn upsert(&self, snapshot: &ExchangeSnapshot) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        *inner = Some(snapshot.clone());
        debug!(base = snapshot.base_currency(), "Snapshot PUT");
        Ok(())
    }
}
