use crate::core::ExchangeSnapshot;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::time::Duration;

/// Decimal places shown for cross rates.
pub const CROSS_RATE_DP: u32 = 6;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Renders the snapshot as a titled currency/rate table.
pub fn snapshot_table(snapshot: &ExchangeSnapshot) -> String {
    let base = snapshot.base_currency();
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Currency"),
        header_cell(&format!("Rate (per 1 {base})")),
    ]);

    for (currency, rate) in snapshot.rates() {
        table.add_row(vec![
            Cell::new(currency),
            Cell::new(rate.normalize()).set_alignment(CellAlignment::Right),
        ]);
    }

    format!(
        "Base Currency: {}\n\n{}",
        style_text(base, StyleType::Title),
        table
    )
}

pub fn format_cross_rate(from: &str, to: &str, rate: Decimal) -> String {
    format!(
        "{from} to {to}: {}",
        style_text(
            &rate.round_dp(CROSS_RATE_DP).normalize().to_string(),
            StyleType::TotalValue
        )
    )
}

/// Creates a spinner shown while a request is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_table_lists_every_rate() {
        let snapshot =
            ExchangeSnapshot::try_new("EUR", [("USD", dec!(1.20)), ("GBP", dec!(0.9))]).unwrap();

        let rendered = snapshot_table(&snapshot);

        assert!(rendered.contains("EUR"));
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("1.2"));
        assert!(rendered.contains("GBP"));
        assert!(rendered.contains("0.9"));
    }

    #[test]
    fn test_format_cross_rate_rounds() {
        let rendered = format_cross_rate("GBP", "USD", dec!(1.2) / dec!(0.9));
        assert!(rendered.starts_with("GBP to USD: "));
        assert!(rendered.contains("1.333333"));
        assert!(!rendered.contains("1.3333333"));
    }
}
