//! Rate provider abstraction

use super::snapshot::ExchangeSnapshot;
use async_trait::async_trait;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the provider's latest rates.
    ///
    /// Returns `None` when rates are not available for any reason. Failures are
    /// reported through tracing, never through the return value, and the call
    /// never retries.
    async fn fetch_latest(&self) -> Option<ExchangeSnapshot>;
}
