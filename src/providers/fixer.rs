use crate::core::config::{API_KEY_ENV, ConfigError};
use crate::core::provider::RateProvider;
use crate::core::snapshot::{ExchangeSnapshot, SnapshotError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: bool,
    base: Option<String>,
    rates: Option<HashMap<String, FixerRate>>,
    error: Option<FixerErrorBody>,
}

/// A rate decoded from the number's digits, never through `f64`.
#[derive(Debug, Deserialize)]
struct FixerRate(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

#[derive(Debug, Deserialize)]
struct FixerErrorBody {
    code: Option<u32>,
    info: Option<String>,
}

#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("provider reported failure (code {code:?}): {info}")]
    Rejected { code: Option<u32>, info: String },
    #[error("response is missing the {0:?} field")]
    MissingField(&'static str),
    #[error("response contains invalid rates: {0}")]
    Invalid(#[from] SnapshotError),
}

/// Client for a Fixer-compatible `/api/latest` endpoint.
pub struct FixerProvider {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl FixerProvider {
    /// Builds the client. Fails when `api_key` is empty so that no client
    /// exists without credentials.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let endpoint = format!("{}/api/latest", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("fxrates/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint,
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Builds the client with the key taken from `FIXER_API_KEY`.
    pub fn from_env(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey)?;
        Self::new(base_url, &api_key, timeout)
    }

    async fn try_fetch(&self) -> Result<ExchangeSnapshot, FetchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("access_key", &self.api_key);
        // Logged without the query so the key stays out of the logs.
        debug!("Requesting exchange rates from {}", self.endpoint);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.without_url()))?;

        let payload: FixerResponse = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(response = %text, "Unparseable rates response");
                return Err(e.into());
            }
        };

        if !payload.success {
            let (code, info) = payload
                .error
                .map(|e| (e.code, e.info.unwrap_or_default()))
                .unwrap_or_default();
            return Err(FetchError::Rejected { code, info });
        }

        let base = payload.base.ok_or(FetchError::MissingField("base"))?;
        let rates = payload.rates.ok_or(FetchError::MissingField("rates"))?;
        Ok(ExchangeSnapshot::try_new(
            &base,
            rates.into_iter().map(|(code, FixerRate(rate))| (code, rate)),
        )?)
    }
}

#[async_trait]
impl RateProvider for FixerProvider {
    #[instrument(name = "FixerFetch", skip(self))]
    async fn fetch_latest(&self) -> Option<ExchangeSnapshot> {
        match self.try_fetch().await {
            Ok(snapshot) => {
                debug!(
                    base = snapshot.base_currency(),
                    currencies = snapshot.len(),
                    "Received exchange rates"
                );
                Some(snapshot)
            }
            Err(e) => {
                error!(error = %e, "Exchange rates not available");
                None
            }
        }
    }
}
