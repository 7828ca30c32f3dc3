use super::{rates::NO_DATA, ui};
use crate::core::snapshot::normalize_code;
use crate::core::{QueryError, RateQuery};
use anyhow::Result;

/// Renders the cross rate between two stored currencies.
///
/// Missing data is reported as text; unknown or identical currencies are errors.
pub async fn render(query: &RateQuery, from: &str, to: &str) -> Result<String> {
    match query.cross_rate(from, to).await {
        Ok(rate) => Ok(ui::format_cross_rate(
            &normalize_code(from),
            &normalize_code(to),
            rate,
        )),
        Err(QueryError::NoData) => Ok(NO_DATA.to_string()),
        Err(e) => Err(e.into()),
    }
}

pub async fn run(query: &RateQuery, from: &str, to: &str) -> Result<()> {
    println!("{}", render(query, from, to).await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExchangeSnapshot, SnapshotStore};
    use crate::store::memory::MemorySnapshotStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn query_with_rates() -> RateQuery {
        let store = Arc::new(MemorySnapshotStore::new());
        store
            .upsert(
                &ExchangeSnapshot::try_new("EUR", [("USD", dec!(1.2)), ("GBP", dec!(0.9))])
                    .unwrap(),
            )
            .await
            .unwrap();
        RateQuery::new(store)
    }

    #[tokio::test]
    async fn test_render_cross_rate() {
        let rendered = render(&query_with_rates().await, "gbp", "usd")
            .await
            .unwrap();
        assert!(rendered.starts_with("GBP to USD: "));
        assert!(rendered.contains("1.333333"));
    }

    #[tokio::test]
    async fn test_render_unknown_currency_fails() {
        let err = render(&query_with_rates().await, "XXX", "USD")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "currency not found: XXX");
    }

    #[tokio::test]
    async fn test_render_without_data() {
        let query = RateQuery::new(Arc::new(MemorySnapshotStore::new()));
        assert_eq!(render(&query, "GBP", "USD").await.unwrap(), NO_DATA);
    }
}
