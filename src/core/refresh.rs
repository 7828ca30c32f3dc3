use super::cross_rate::{CrossRateError, cross_rate};
use super::provider::RateProvider;
use super::snapshot::ExchangeSnapshot;
use super::store::{SnapshotStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("exchange rates are not available from the provider")]
    NotAvailable,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No exchange rates available.")]
    NoData,
    #[error(transparent)]
    CrossRate(#[from] CrossRateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One fetch-then-store cycle.
pub struct RefreshService {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn SnapshotStore>,
    cycle: Mutex<()>,
}

impl RefreshService {
    pub fn new(provider: Arc<dyn RateProvider>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            provider,
            store,
            cycle: Mutex::new(()),
        }
    }

    /// Fetches the latest rates and replaces the stored snapshot with them.
    ///
    /// On failure the previously stored snapshot is left untouched. Concurrent
    /// callers queue up, so cycles finish in the order they started.
    pub async fn refresh(&self) -> Result<ExchangeSnapshot, RefreshError> {
        // Held across fetch and upsert.
        let _cycle = self.cycle.lock().await;

        let Some(snapshot) = self.provider.fetch_latest().await else {
            warn!("Provider returned no exchange rates, keeping stored snapshot");
            return Err(RefreshError::NotAvailable);
        };

        self.store.upsert(&snapshot).await?;
        info!(
            base = snapshot.base_currency(),
            currencies = snapshot.len(),
            "Exchange rates updated"
        );
        Ok(snapshot)
    }
}

/// Read-side access to the stored snapshot.
#[derive(Clone)]
pub struct RateQuery {
    store: Arc<dyn SnapshotStore>,
}

impl RateQuery {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn latest(&self) -> Result<ExchangeSnapshot, QueryError> {
        self.store.get().await?.ok_or(QueryError::NoData)
    }

    pub async fn cross_rate(&self, from: &str, to: &str) -> Result<Decimal, QueryError> {
        let snapshot = self.latest().await?;
        let rate = cross_rate(from, to, &snapshot)?;
        debug!(from, to, %rate, "Computed cross rate");
        Ok(rate)
    }
}
