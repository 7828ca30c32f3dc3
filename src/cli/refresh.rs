use super::ui;
use crate::core::RefreshService;
use anyhow::{Context, Result};

/// Fetches the latest rates once, stores them and prints the new snapshot.
pub async fn run(service: &RefreshService) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = service.refresh().await;
    pb.finish_and_clear();

    let snapshot = result.context("Failed to update exchange rates")?;
    println!(
        "{} {} currencies against {}\n",
        ui::style_text("Exchange rates updated:", ui::StyleType::TotalLabel),
        snapshot.len(),
        snapshot.base_currency()
    );
    println!("{}", ui::snapshot_table(&snapshot));
    Ok(())
}
