use super::ui;
use crate::core::{QueryError, RateQuery};
use anyhow::Result;

pub const NO_DATA: &str = "No exchange rates available.";

/// Renders the stored snapshot, or the "no data" notice when nothing is stored.
pub async fn render(query: &RateQuery) -> Result<String> {
    match query.latest().await {
        Ok(snapshot) => Ok(ui::snapshot_table(&snapshot)),
        Err(QueryError::NoData) => Ok(NO_DATA.to_string()),
        Err(e) => Err(e.into()),
    }
}

pub async fn run(query: &RateQuery) -> Result<()> {
    println!("{}", render(query).await?);
    Ok(())
}
