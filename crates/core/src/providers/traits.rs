use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::rates::ExchangeRates;

/// Source of an anchor-relative exchange-rate table.
///
/// Each public rate API implements this trait. Responses are untrusted:
/// implementations drop unusable multipliers and report malformed or
/// unsuccessful responses as `CoreError::Api`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest table. `base` is the ledger's base currency; a provider
    /// may anchor the table on it or on any other currency it prefers.
    async fn fetch_latest(&self, base: &str) -> Result<ExchangeRates, CoreError>;
}
