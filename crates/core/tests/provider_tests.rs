// ═══════════════════════════════════════════════════════════════════
// Provider Tests - response parsing, registry, RateService fallback
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use finance_tracker_core::config::TrackerConfig;
use finance_tracker_core::errors::CoreError;
use finance_tracker_core::models::rates::ExchangeRates;
use finance_tracker_core::providers::exchangerate_api::{self, ExchangeRateApiProvider};
use finance_tracker_core::providers::frankfurter::{self, FrankfurterProvider, FRANKFURTER_ANCHOR};
use finance_tracker_core::providers::registry::RateProviderRegistry;
use finance_tracker_core::providers::traits::RateProvider;
use finance_tracker_core::services::rate_service::RateService;

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Returns a fixed table and counts calls.
struct MockRateProvider {
    name: String,
    table: ExchangeRates,
    calls: Arc<AtomicUsize>,
}

impl MockRateProvider {
    fn new(name: &str, table: ExchangeRates) -> Self {
        Self {
            name: name.to_string(),
            table,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_latest(&self, _base: &str) -> Result<ExchangeRates, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.clone())
    }
}

/// Always fails, like an unreachable host.
struct FailingMockProvider;

#[async_trait]
impl RateProvider for FailingMockProvider {
    fn name(&self) -> &str {
        "FailingMock"
    }

    async fn fetch_latest(&self, base: &str) -> Result<ExchangeRates, CoreError> {
        Err(CoreError::Network(format!("Simulated failure for {base}")))
    }
}

fn inr_table() -> ExchangeRates {
    ExchangeRates::new("INR")
        .with_rate("INR", 1.0)
        .with_rate("USD", 0.012)
}

// ═══════════════════════════════════════════════════════════════════
// ExchangeRate-API parsing
// ═══════════════════════════════════════════════════════════════════

mod exchangerate_api_parsing {
    use super::*;

    #[test]
    fn parses_v4_shape() {
        let body = r#"{
            "provider": "https://www.exchangerate-api.com",
            "base": "INR",
            "date": "2024-03-05",
            "time_last_updated": 1709596801,
            "rates": {"INR": 1, "USD": 0.01207, "EUR": 0.01112, "JPY": 1.81}
        }"#;
        let table = exchangerate_api::parse_latest(body, "INR").unwrap();
        assert_eq!(table.anchor, "INR");
        assert_eq!(table.len(), 4);
        assert_eq!(table.rate("INR"), Some(1.0));
        assert_eq!(table.rate("USD"), Some(0.01207));
        assert!(table.fetched_at.is_some());
    }

    #[test]
    fn parses_v6_shape() {
        let body = r#"{
            "result": "success",
            "base_code": "INR",
            "conversion_rates": {"INR": 1, "GBP": 0.0095}
        }"#;
        let table = exchangerate_api::parse_latest(body, "INR").unwrap();
        assert_eq!(table.anchor, "INR");
        assert_eq!(table.rate("GBP"), Some(0.0095));
    }

    #[test]
    fn v6_error_result_is_api_error() {
        let body = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        let err = exchangerate_api::parse_latest(body, "XXX").unwrap_err();
        match err {
            CoreError::Api { provider, message } => {
                assert_eq!(provider, "ExchangeRate-API");
                assert!(message.contains("unsupported-code"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn missing_rate_table_is_error() {
        let err = exchangerate_api::parse_latest(r#"{"base": "INR"}"#, "INR").unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[test]
    fn malformed_body_is_error() {
        let err = exchangerate_api::parse_latest("<html>down</html>", "INR").unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[test]
    fn untrusted_values_dropped() {
        let body = r#"{"base": "INR", "rates": {"INR": 1, "USD": 0, "EUR": -2, "GBP": "x", "JPY": 1.8}}"#;
        let table = exchangerate_api::parse_latest(body, "INR").unwrap();
        assert_eq!(table.codes(), vec!["INR", "JPY"]);
    }

    #[test]
    fn anchor_defaults_to_requested_base() {
        let table = exchangerate_api::parse_latest(r#"{"rates": {"INR": 1}}"#, "INR").unwrap();
        assert_eq!(table.anchor, "INR");
    }

    #[test]
    fn base_url_is_normalized() {
        let provider = ExchangeRateApiProvider::with_base_url("https://example.test/v4/", 5);
        assert_eq!(provider.base_url(), "https://example.test/v4");
        assert_eq!(provider.name(), "ExchangeRate-API");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Frankfurter parsing
// ═══════════════════════════════════════════════════════════════════

mod frankfurter_parsing {
    use super::*;

    #[test]
    fn inserts_anchor_rate() {
        let body = r#"{"amount": 1.0, "base": "EUR", "date": "2024-03-05",
                       "rates": {"INR": 89.9, "USD": 1.0854}}"#;
        let table = frankfurter::parse_latest(body).unwrap();
        assert_eq!(table.anchor, FRANKFURTER_ANCHOR);
        assert_eq!(table.rate("EUR"), Some(1.0));
        assert_eq!(table.rate("INR"), Some(89.9));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn missing_base_defaults_to_eur() {
        let table = frankfurter::parse_latest(r#"{"rates": {"INR": 90}}"#).unwrap();
        assert_eq!(table.anchor, "EUR");
        assert_eq!(table.rate("EUR"), Some(1.0));
    }

    #[test]
    fn malformed_body_is_error() {
        let err = frankfurter::parse_latest("{}").unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "Frankfurter"));
    }

    #[test]
    fn provider_name() {
        assert_eq!(FrankfurterProvider::new().name(), "Frankfurter");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn defaults_in_priority_order() {
        let registry = RateProviderRegistry::new_with_defaults(&TrackerConfig::default());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.provider_names(), vec!["ExchangeRate-API", "Frankfurter"]);
    }

    #[test]
    fn empty_registry() {
        let registry = RateProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.provider_names().is_empty());
    }

    #[test]
    fn register_appends() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingMockProvider));
        registry.register(Box::new(MockRateProvider::new("Mock", inr_table())));
        assert_eq!(registry.provider_names(), vec!["FailingMock", "Mock"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RateService
// ═══════════════════════════════════════════════════════════════════

mod rate_service {
    use super::*;

    #[tokio::test]
    async fn first_provider_wins() {
        let primary = MockRateProvider::new("Primary", inr_table());
        let secondary = MockRateProvider::new("Secondary", inr_table().with_rate("EUR", 0.011));
        let secondary_calls = secondary.calls.clone();

        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(primary));
        registry.register(Box::new(secondary));
        let service = RateService::new(registry);

        let table = service.refresh("INR").await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_after_failure() {
        let fallback = MockRateProvider::new("Fallback", inr_table());
        let calls = fallback.calls.clone();

        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingMockProvider));
        registry.register(Box::new(fallback));
        let service = RateService::new(registry);

        let table = service.refresh("inr").await.unwrap();
        assert_eq!(table.rate("USD"), Some(0.012));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn table_without_base_is_skipped() {
        let useless = MockRateProvider::new("NoBase", ExchangeRates::new("EUR").with_rate("USD", 1.1));
        let good = MockRateProvider::new("Good", inr_table());

        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(useless));
        registry.register(Box::new(good));
        let service = RateService::new(registry);

        let table = service.refresh("INR").await.unwrap();
        assert_eq!(table.anchor, "INR");
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingMockProvider));
        registry.register(Box::new(FailingMockProvider));
        let service = RateService::new(registry);

        let err = service.refresh("INR").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }

    #[tokio::test]
    async fn empty_registry_is_no_provider() {
        let service = RateService::new(RateProviderRegistry::new());
        let err = service.refresh("INR").await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(ExchangeRateApiProvider::with_base_url("http://127.0.0.1:9", 2)));
        let service = RateService::new(registry);

        let err = service.refresh("INR").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
    }
}
