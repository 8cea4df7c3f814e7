use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BASE_CURRENCY;

/// UI color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Anything other than `"light"` / `"dark"` is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences, persisted alongside the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Display currency code (e.g. "INR", "USD").
    pub currency: String,

    /// Account the views are filtered to. `None` means all accounts.
    pub active_account: Option<String>,

    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: DEFAULT_BASE_CURRENCY.to_string(),
            active_account: None,
            theme: Theme::Dark,
        }
    }
}

/// Normalize an account filter: blank and `"all"` mean no filter.
pub fn normalize_account_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}
