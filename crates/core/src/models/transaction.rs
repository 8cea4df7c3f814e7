use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::ExpenseCategory;

/// Income source used when the caller leaves it blank.
pub const DEFAULT_INCOME_SOURCE: &str = "Unknown Source";

/// Income or expense, with the fields each one requires.
///
/// Serialized internally tagged: `{"type": "expense", "category": "Food"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Income {
        #[serde(default = "default_source")]
        source: String,
    },
    Expense {
        #[serde(default)]
        category: ExpenseCategory,
    },
}

fn default_source() -> String {
    DEFAULT_INCOME_SOURCE.to_string()
}

impl TransactionKind {
    pub fn income(source: impl Into<String>) -> Self {
        TransactionKind::Income {
            source: source.into(),
        }
    }

    pub fn expense(category: impl Into<ExpenseCategory>) -> Self {
        TransactionKind::Expense {
            category: category.into(),
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, TransactionKind::Income { .. })
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, TransactionKind::Expense { .. })
    }

    /// Title used when the caller gives none.
    pub fn default_title(&self) -> &'static str {
        match self {
            TransactionKind::Income { .. } => "Income",
            TransactionKind::Expense { .. } => "Expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income { .. } => write!(f, "income"),
            TransactionKind::Expense { .. } => write!(f, "expense"),
        }
    }
}

/// A single recorded income or expense.
///
/// `amount` is always positive and in the base currency; the sign comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, never reused.
    pub id: String,

    #[serde(flatten)]
    pub kind: TransactionKind,

    /// The account this transaction moves money in or out of.
    pub account_id: String,

    pub amount: f64,

    pub title: String,

    /// When it happened, with the local UTC offset at recording time.
    pub date: DateTime<FixedOffset>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        account_id: impl Into<String>,
        amount: f64,
        title: impl Into<String>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            account_id: account_id.into(),
            amount,
            title: title.into(),
            date,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind.is_income()
    }

    pub fn is_expense(&self) -> bool {
        self.kind.is_expense()
    }

    /// Effect on the account balance: `+amount` for income, `-amount` for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income { .. } => self.amount,
            TransactionKind::Expense { .. } => -self.amount,
        }
    }

    pub fn category(&self) -> Option<&ExpenseCategory> {
        match &self.kind {
            TransactionKind::Expense { category } => Some(category),
            TransactionKind::Income { .. } => None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Income { source } => Some(source),
            TransactionKind::Expense { .. } => None,
        }
    }

    /// Calendar day in the system's local timezone, whatever offset the
    /// timestamp was stored with.
    pub fn local_date(&self) -> NaiveDate {
        self.date_in(&Local)
    }

    /// Calendar day as seen from `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub account_id: String,
    pub amount: f64,
    pub title: Option<String>,
    /// Defaults to the current local time.
    pub date: Option<DateTime<FixedOffset>>,
}

impl NewTransaction {
    pub fn income(account_id: impl Into<String>, amount: f64, source: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::income(source),
            account_id: account_id.into(),
            amount,
            title: None,
            date: None,
        }
    }

    pub fn expense(
        account_id: impl Into<String>,
        amount: f64,
        category: impl Into<ExpenseCategory>,
    ) -> Self {
        Self {
            kind: TransactionKind::expense(category),
            account_id: account_id.into(),
            amount,
            title: None,
            date: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn at(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }
}
