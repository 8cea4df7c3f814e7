use serde::{Deserialize, Serialize};

/// Account type used when the caller leaves it blank.
pub const DEFAULT_ACCOUNT_KIND: &str = "Bank";

/// Color assigned to new accounts when none is given.
pub const DEFAULT_ACCOUNT_COLOR: &str = "#6c5ce7";

/// A money container (bank account, cash wallet, ...).
///
/// All monetary fields are in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable identifier. Equal to the name the account was created with.
    pub id: String,

    /// Display label, unique within the ledger.
    pub name: String,

    /// Free-form classification ("Bank", "Cash", ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// Optional display color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Balance the account was created with.
    pub opening_balance: f64,

    /// Current balance: opening balance plus the signed sum of its transactions.
    pub balance: f64,
}

/// Input for creating an account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub kind: String,
    pub opening_balance: Option<f64>,
    pub color: Option<String>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_opening_balance(mut self, balance: f64) -> Self {
        self.opening_balance = Some(balance);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// An account whose stored balance disagrees with its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMismatch {
    pub account_id: String,
    pub stored: f64,
    pub expected: f64,
}
