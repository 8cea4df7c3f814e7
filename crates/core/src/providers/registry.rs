use crate::config::TrackerConfig;

use super::exchangerate_api::ExchangeRateApiProvider;
use super::frankfurter::FrankfurterProvider;
use super::traits::RateProvider;

/// Ordered list of rate providers.
///
/// The first provider is the primary source; the rest are fallbacks tried in
/// registration order when an earlier one fails.
pub struct RateProviderRegistry {
    providers: Vec<Box<dyn RateProvider>>,
}

impl RateProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with the default chain: ExchangeRate-API, then Frankfurter.
    pub fn new_with_defaults(config: &TrackerConfig) -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(ExchangeRateApiProvider::with_base_url(
            config.exchange_rate_api_url.clone(),
            config.request_timeout_secs,
        )));

        registry.register(Box::new(FrankfurterProvider::with_base_url(
            config.frankfurter_url.clone(),
            config.request_timeout_secs,
        )));

        registry
    }

    /// Register a new rate provider at the end of the chain.
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        self.providers.push(provider);
    }

    /// All providers in priority order.
    pub fn providers(&self) -> impl Iterator<Item = &dyn RateProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for RateProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
