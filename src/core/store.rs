//! Snapshot storage abstraction

use super::snapshot::ExchangeSnapshot;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("failed to encode or decode snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Holds at most one snapshot.
///
/// Implementations serialize `get` and `upsert` so a reader observes either the
/// old snapshot or the new one, never a mix of both.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored snapshot, or `None` if nothing has been stored yet.
    async fn get(&self) -> Result<Option<ExchangeSnapshot>, StoreError>;

    /// Replaces the stored snapshot, base currency and all rates, in one step.
    async fn upsert(&self, snapshot: &ExchangeSnapshot) -> Result<(), StoreError>;
}
