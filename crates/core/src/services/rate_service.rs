use crate::errors::CoreError;
use crate::models::rates::ExchangeRates;
use crate::providers::registry::RateProviderRegistry;

/// Fetches the exchange-rate table with automatic provider fallback.
///
/// Best effort by nature: one pass over the provider chain, no retries or
/// backoff. A failed refresh is reported to the caller, which keeps using
/// whatever table it already has (empty at startup, meaning identity
/// conversion).
pub struct RateService {
    registry: RateProviderRegistry,
}

impl RateService {
    pub fn new(registry: RateProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Try each provider in registration order; the first table containing
    /// the base currency and at least one other rate wins.
    pub async fn refresh(&self, base: &str) -> Result<ExchangeRates, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let base = base.trim().to_uppercase();
        let mut last_error = None;

        for provider in self.registry.providers() {
            match provider.fetch_latest(&base).await {
                Ok(table) if table.rate(&base).is_some() && table.len() > 1 => {
                    tracing::info!(
                        provider = provider.name(),
                        anchor = %table.anchor,
                        rates = table.len(),
                        "exchange rates refreshed"
                    );
                    return Ok(table);
                }
                Ok(table) => {
                    tracing::warn!(
                        provider = provider.name(),
                        rates = table.len(),
                        "rate table unusable for base {base}"
                    );
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Rate table has no usable rate for {base}"),
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "rate provider failed");
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}
