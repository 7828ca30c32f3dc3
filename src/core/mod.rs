//! Core business logic abstractions

pub mod config;
pub mod cross_rate;
pub mod log;
pub mod provider;
pub mod refresh;
pub mod scheduler;
pub mod snapshot;
pub mod store;

// Re-export main types for cleaner imports
pub use cross_rate::{CrossRateError, Side, cross_rate};
pub use provider::RateProvider;
pub use refresh::{QueryError, RateQuery, RefreshError, RefreshService};
pub use scheduler::{RefreshEvent, RefreshScheduler, SchedulerHandle};
pub use snapshot::ExchangeSnapshot;
pub use store::{SnapshotStore, StoreError};
