use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::config::DEFAULT_FRANKFURTER_URL;
use crate::errors::CoreError;
use crate::models::rates::ExchangeRates;
use super::traits::RateProvider;

/// Anchor of every table this provider returns.
pub const FRANKFURTER_ANCHOR: &str = "EUR";

/// Frankfurter API provider for fiat currency exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data.
/// - **Coverage**: ~30 currencies, INR included.
///
/// The table is always EUR-anchored, whatever the ledger's base currency is.
/// Frankfurter leaves the anchor out of `rates`, so it is added with 1.0.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_FRANKFURTER_URL, 30)
    }

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
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    #[serde(default)]
    base: Option<String>,
    rates: HashMap<String, serde_json::Value>,
}

/// Parse a Frankfurter `latest` body into an anchor-complete table.
pub fn parse_latest(body: &str) -> Result<ExchangeRates, CoreError> {
    let resp: RatesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: "Frankfurter".into(),
        message: format!("Failed to parse latest rates: {e}"),
    })?;

    let anchor = resp
        .base
        .unwrap_or_else(|| FRANKFURTER_ANCHOR.to_string())
        .to_uppercase();

    let mut table = ExchangeRates::new(anchor.clone());
    for (code, value) in resp.rates {
        if let Some(rate) = value.as_f64() {
            table.set_rate(&code, rate);
        }
    }
    table.set_rate(&anchor, 1.0);
    table.fetched_at = Some(Utc::now());
    Ok(table)
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    async fn fetch_latest(&self, _base: &str) -> Result<ExchangeRates, CoreError> {
        let url = format!("{}/latest?base={FRANKFURTER_ANCHOR}", self.base_url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("HTTP {status} for latest rates"),
            });
        }

        let body = resp.text().await?;
        parse_latest(&body)
    }
}
