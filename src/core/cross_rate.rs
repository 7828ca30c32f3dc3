//! Cross rates derived from a snapshot's base-relative rates

use super::snapshot::{ExchangeSnapshot, normalize_code};
use rust_decimal::Decimal;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::From => "source",
                Side::To => "target",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrossRateError {
    #[error("the source and target currencies are the same: {0}")]
    SameCurrency(String),
    #[error("currency not found: {code}")]
    CurrencyNotFound { side: Side, code: String },
    #[error("cannot derive a rate from {from} to {to}")]
    InvalidRate { from: String, to: String },
}

/// Units of `to` per one unit of `from`, computed as `rate(to) / rate(from)`.
///
/// Both codes are matched case-insensitively against the snapshot.
pub fn cross_rate(
    from: &str,
    to: &str,
    snapshot: &ExchangeSnapshot,
) -> Result<Decimal, CrossRateError> {
    let from = normalize_code(from);
    let to = normalize_code(to);

    if from == to {
        return Err(CrossRateError::SameCurrency(from));
    }

    let from_rate = snapshot
        .rate(&from)
        .ok_or_else(|| CrossRateError::CurrencyNotFound {
            side: Side::From,
            code: from.clone(),
        })?;
    let to_rate = snapshot
        .rate(&to)
        .ok_or_else(|| CrossRateError::CurrencyNotFound {
            side: Side::To,
            code: to.clone(),
        })?;

    to_rate
        .checked_div(from_rate)
        .ok_or(CrossRateError::InvalidRate { from, to })
}
