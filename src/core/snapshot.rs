//! The exchange-rate snapshot, the only entity the app persists

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),
    #[error("rate for {currency} must be positive, got {rate}")]
    NonPositiveRate { currency: String, rate: Decimal },
    #[error("duplicate rate entry for {0}")]
    DuplicateCurrency(String),
    #[error("snapshot contains no rates")]
    EmptyRates,
}

/// Upper-cases and trims a currency code. Lookups always go through this.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// A currency code is three ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Rates for every known currency relative to one base currency.
///
/// Each rate is the number of units of that currency per one unit of the base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct ExchangeSnapshot {
    base_currency: String,
    rates: BTreeMap<String, Decimal>,
}

/// Wire form of a snapshot before validation.
#[derive(Deserialize)]
struct RawSnapshot {
    base_currency: String,
    rates: BTreeMap<String, Decimal>,
}

impl TryFrom<RawSnapshot> for ExchangeSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        Self::try_new(&raw.base_currency, raw.rates)
    }
}

impl ExchangeSnapshot {
    /// Builds a validated snapshot. Codes are normalized to uppercase.
    pub fn try_new<I, S>(base_currency: &str, rates: I) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let base_currency = normalize_code(base_currency);
        if !is_currency_code(&base_currency) {
            return Err(SnapshotError::InvalidCurrencyCode(base_currency));
        }

        let mut normalized = BTreeMap::new();
        for (code, rate) in rates {
            let currency = normalize_code(code.as_ref());
            if !is_currency_code(&currency) {
                return Err(SnapshotError::InvalidCurrencyCode(currency));
            }
            if rate <= Decimal::ZERO {
                return Err(SnapshotError::NonPositiveRate { currency, rate });
            }
            if normalized.insert(currency.clone(), rate).is_some() {
                return Err(SnapshotError::DuplicateCurrency(currency));
            }
        }

        if normalized.is_empty() {
            return Err(SnapshotError::EmptyRates);
        }

        Ok(Self {
            base_currency,
            rates: normalized,
        })
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn rates(&self) -> &BTreeMap<String, Decimal> {
        &self.rates
    }

    /// Looks up the rate for an already-normalized code.
    pub fn rate(&self, currency: &str) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_try_new_normalizes_codes() {
        let snapshot =
            ExchangeSnapshot::try_new(" eur", [("usd", dec!(1.2)), ("Gbp", dec!(0.9))]).unwrap();

        assert_eq!(snapshot.base_currency(), "EUR");
        assert_eq!(snapshot.rate("USD"), Some(dec!(1.2)));
        assert_eq!(snapshot.rate("GBP"), Some(dec!(0.9)));
        assert_eq!(snapshot.rate("usd"), None);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_try_new_rejects_bad_input() {
        assert_eq!(
            ExchangeSnapshot::try_new("EURO", [("USD", dec!(1.2))]),
            Err(SnapshotError::InvalidCurrencyCode("EURO".to_string()))
        );
        assert_eq!(
            ExchangeSnapshot::try_new("EUR", [("U$D", dec!(1.2))]),
            Err(SnapshotError::InvalidCurrencyCode("U$D".to_string()))
        );
        assert_eq!(
            ExchangeSnapshot::try_new("EUR", [("USD", dec!(0))]),
            Err(SnapshotError::NonPositiveRate {
                currency: "USD".to_string(),
                rate: dec!(0)
            })
        );
        assert_eq!(
            ExchangeSnapshot::try_new("EUR", [("USD", dec!(1.2)), ("usd", dec!(1.3))]),
            Err(SnapshotError::DuplicateCurrency("USD".to_string()))
        );
        assert_eq!(
            ExchangeSnapshot::try_new("EUR", Vec::<(String, Decimal)>::new()),
            Err(SnapshotError::EmptyRates)
        );
    }

    #[test]
    fn test_serialized_rates_are_decimal_strings() {
        let snapshot = ExchangeSnapshot::try_new("EUR", [("USD", dec!(1.2))]).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        assert_eq!(json, r#"{"base_currency":"EUR","rates":{"USD":"1.2"}}"#);
        let parsed: ExchangeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_deserialize_validates_snapshot() {
        let negative = r#"{"base_currency":"EUR","rates":{"USD":"-1.2"}}"#;
        let err = serde_json::from_str::<ExchangeSnapshot>(negative).unwrap_err();
        assert!(err.to_string().contains("must be positive"));

        let bad_code = r#"{"base_currency":"EUR","rates":{"DOLLAR":"1.2"}}"#;
        assert!(serde_json::from_str::<ExchangeSnapshot>(bad_code).is_err());

        let empty = r#"{"base_currency":"EUR","rates":{}}"#;
        assert!(serde_json::from_str::<ExchangeSnapshot>(empty).is_err());

        let lower = r#"{"base_currency":"eur","rates":{"usd":"1.2"}}"#;
        let parsed: ExchangeSnapshot = serde_json::from_str(lower).unwrap();
        assert_eq!(parsed.base_currency(), "EUR");
        assert_eq!(parsed.rate("USD"), Some(dec!(1.2)));
    }
}
