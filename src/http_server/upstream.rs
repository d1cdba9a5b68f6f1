//! # Upstream Lookups
//!
//! HTTP client for the external services behind `/bitcoin-rate` and
//! `/get-astronauts`.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::config::UpstreamConfig;
use super::errors::ApiError;

/// Result type for upstream calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Upstream call failures
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service replied with a non-200 status
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// The request never completed
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// The body was not the expected JSON
    #[error("Upstream response malformed: {0}")]
    Decode(String),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        tracing::warn!(error = %err, "upstream lookup failed");
        match err {
            UpstreamError::Status(code) => {
                ApiError::Upstream(StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY))
            }
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => {
                ApiError::Upstream(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(default)]
    rate: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CurrenciesResponse {
    #[serde(default)]
    data: Vec<CurrencyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AstrosResponse {
    #[serde(default)]
    people: Vec<Astronaut>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Astronaut {
    pub craft: String,
    #[serde(default)]
    pub name: String,
}

/// Client for the rate and astronaut services
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> UpstreamResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> UpstreamResult<T> {
        tracing::debug!(url, "upstream request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// `The bitcoin rate is {rate} {symbol}` for `currency`
    pub async fn bitcoin_rate(&self, currency: &str) -> UpstreamResult<String> {
        let base = self.config.bitpay_base_url.trim_end_matches('/');

        let rate: RateResponse = self
            .get_json(&format!("{}/api/rates/{}", base, currency))
            .await?;
        let currencies: CurrenciesResponse =
            self.get_json(&format!("{}/currencies", base)).await?;

        let symbol = find_symbol(&currencies.data, currency);
        Ok(format!(
            "The bitcoin rate is {} {}",
            render_rate(rate.rate.as_ref()),
            symbol
        ))
    }

    /// Number of people aboard each craft
    pub async fn astronauts_by_craft(&self) -> UpstreamResult<BTreeMap<String, u64>> {
        let astros: AstrosResponse = self.get_json(&self.config.open_notify_url).await?;
        Ok(count_by_craft(&astros.people))
    }
}

/// Symbol for `code`, falling back to the code itself
pub fn find_symbol(currencies: &[CurrencyEntry], code: &str) -> String {
    currencies
        .iter()
        .find(|entry| entry.code.as_deref() == Some(code))
        .and_then(|entry| entry.symbol.clone())
        .unwrap_or_else(|| code.to_string())
}

/// Rate as text, `?` when the service omitted it
pub fn render_rate(rate: Option<&Value>) -> String {
    match rate {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn count_by_craft(people: &[Astronaut]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for person in people {
        *counts.entry(person.craft.clone()).or_insert(0) += 1;
    }
    counts
}
