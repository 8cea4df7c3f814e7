use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Currency every amount is persisted in.
pub const DEFAULT_BASE_CURRENCY: &str = "INR";

/// Prefix prepended to every storage key (`finance_accounts`, ...).
pub const DEFAULT_STORAGE_PREFIX: &str = "finance_";

pub const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://api.exchangerate-api.com/v4";
pub const DEFAULT_FRANKFURTER_URL: &str = "https://api.frankfurter.dev/v1";

/// Process-level configuration for a [`crate::FinanceTracker`].
///
/// Unlike [`crate::models::preferences::Preferences`], nothing here is
/// user-editable at runtime or persisted in the key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// ISO-4217-like code of the currency all amounts are stored in.
    pub base_currency: String,

    /// Prefix for the key-value store keys.
    pub storage_prefix: String,

    /// Base URL of the primary rate service (exchangerate-api.com compatible).
    pub exchange_rate_api_url: String,

    /// Base URL of the Frankfurter fallback.
    pub frankfurter_url: String,

    /// HTTP timeout for a single rate request (native only).
    pub request_timeout_secs: u64,

    /// Fixed UTC offset in minutes for calendar views. Unset follows the
    /// system's local timezone, daylight saving included.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            exchange_rate_api_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
            frankfurter_url: DEFAULT_FRANKFURTER_URL.to_string(),
            request_timeout_secs: 30,
            utc_offset_minutes: None,
        }
    }
}

impl TrackerConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut config: TrackerConfig = serde_json::from_str(json)?;
        config.base_currency = config.base_currency.trim().to_uppercase();
        Ok(config)
    }

    /// Load a config file from disk. A missing file yields the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// The configured fixed offset, if it is set and in range (under 24h).
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }

    /// Full storage key for a logical key name.
    pub fn storage_key(&self, name: &str) -> String {
        format!("{}{}", self.storage_prefix, name)
    }
}
