use crate::core::snapshot::ExchangeSnapshot;
use crate::core::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const PARTITION: &str = "exchange_rates";
const SNAPSHOT_KEY: &str = "current";

/// Snapshot store backed by a fjall keyspace on disk.
///
/// The whole snapshot lives under a single key, so one insert replaces the
/// base currency and every rate together.
pub struct DiskSnapshotStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    write_lock: Mutex<()>,
}

impl DiskSnapshotStore {
    /// Opens the store at `path`, creating the directory if it is missing.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open().map_err(backend_error)?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(backend_error)?;
        debug!("Opened snapshot store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
            write_lock: Mutex::new(()),
        })
    }
}

fn backend_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl SnapshotStore for DiskSnapshotStore {
    async fn get(&self) -> Result<Option<ExchangeSnapshot>, StoreError> {
        let partition = self.partition.clone();
        let value = tokio::task::spawn_blocking(move || partition.get(SNAPSHOT_KEY))
            .await
            .map_err(backend_error)?
            .map_err(backend_error)?;

        match value {
            Some(bytes) => {
                debug!("Snapshot HIT");
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => {
                debug!("Snapshot MISS");
                Ok(None)
            }
        }
    }

    async fn upsert(&self, snapshot: &ExchangeSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(snapshot)?;

        let _guard = self.write_lock.lock().await;
        let keyspace = self.keyspace.clone();
        let partition = self.partition.clone();
        tokio::task::spawn_blocking(move || -> Result<(), fjall::Error> {
            partition.insert(SNAPSHOT_KEY, bytes)?;
            keyspace.persist(PersistMode::SyncAll)
        })
        .await
        .map_err(backend_error)?
        .map_err(backend_error)?;

        debug!(base = snapshot.base_currency(), "Snapshot PUT");
        Ok(())
    }
}
