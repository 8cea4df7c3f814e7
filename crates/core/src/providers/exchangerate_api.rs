use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::config::DEFAULT_EXCHANGE_RATE_API_URL;
use crate::errors::CoreError;
use crate::models::rates::ExchangeRates;
use super::traits::RateProvider;

const PROVIDER_NAME: &str = "ExchangeRate-API";

/// exchangerate-api.com provider.
///
/// - **Free tier**: the open `v4/latest/{BASE}` endpoint needs no key.
/// - **Keyed tier**: `v6/{KEY}/latest/{BASE}` returns the same table under
///   `conversion_rates` together with a `result` status field.
///
/// Both response shapes are accepted. The table is anchored on the requested
/// base, so conversions from base are a single multiplication.
pub struct ExchangeRateApiProvider {
    client: Client,
    base_url: String,
}

impl ExchangeRateApiProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_EXCHANGE_RATE_API_URL, 30)
    }

    /// Point the provider at another deployment (a v6 URL including the key works too).
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for ExchangeRateApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── ExchangeRate-API response types ─────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    /// v6 only: "success" or "error"
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    /// v4 anchor field
    #[serde(default)]
    base: Option<String>,
    /// v6 anchor field
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, serde_json::Value>>,
}

/// Parse a `latest` response body into a rate table.
///
/// `requested_base` is used as the anchor when the body does not name one.
/// Entries that are not positive finite numbers are dropped.
pub fn parse_latest(body: &str, requested_base: &str) -> Result<ExchangeRates, CoreError> {
    let resp: LatestResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message: format!("Malformed response: {e}"),
    })?;

    if let Some(result) = resp.result.as_deref() {
        if result != "success" {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!(
                    "Request unsuccessful ({})",
                    resp.error_type.as_deref().unwrap_or(result)
                ),
            });
        }
    }

    let raw = resp
        .conversion_rates
        .or(resp.rates)
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: "Response contains no rate table".into(),
        })?;

    let anchor = resp
        .base_code
        .or(resp.base)
        .unwrap_or_else(|| requested_base.to_string());

    let mut table = ExchangeRates::new(anchor);
    for (code, value) in raw {
        if let Some(rate) = value.as_f64() {
            table.set_rate(&code, rate);
        }
    }
    table.fetched_at = Some(Utc::now());
    Ok(table)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_latest(&self, base: &str) -> Result<ExchangeRates, CoreError> {
        let base = base.trim().to_uppercase();
        let url = format!("{}/latest/{base}", self.base_url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("HTTP {status} for latest/{base}"),
            });
        }

        let body = resp.text().await?;
        parse_latest(&body, &base)
    }
}
