pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreKind};
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use disk::DiskSnapshotStore;
use memory::MemorySnapshotStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the snapshot store selected by the configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.store.kind {
        StoreKind::Memory => {
            debug!("Using in-memory snapshot store");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
        StoreKind::Disk => {
            let path = config.snapshot_path()?;
            let store = DiskSnapshotStore::open(&path).with_context(|| {
                format!("Failed to open snapshot store at {}", path.display())
            })?;
            Ok(Arc::new(store))
        }
    }
}
