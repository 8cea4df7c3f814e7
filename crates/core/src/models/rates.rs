use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exchange-rate table: currency code → multiplier relative to `anchor`.
///
/// Empty by default. An empty table (or one missing the codes involved)
/// makes every conversion the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// Currency the multipliers are expressed against.
    pub anchor: String,

    pub rates: HashMap<String, f64>,

    /// When the table was fetched. `None` for hand-built tables.
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ExchangeRates {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into().to_uppercase(),
            rates: HashMap::new(),
            fetched_at: None,
        }
    }

    /// Build a table from raw provider data, dropping unusable multipliers.
    pub fn from_rates(anchor: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        let mut table = Self::new(anchor);
        for (code, rate) in rates {
            table.set_rate(&code, rate);
        }
        table
    }

    /// Insert a multiplier. Non-finite or non-positive values are ignored.
    pub fn set_rate(&mut self, code: &str, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rates.insert(code.trim().to_uppercase(), rate);
        }
    }

    pub fn with_rate(mut self, code: &str, rate: f64) -> Self {
        self.set_rate(code, rate);
        self
    }

    /// Usable multiplier for `code`, if any.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(&code.to_uppercase())
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Known codes, sorted (for currency pickers).
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
