//! Lenient on-disk record shapes.
//!
//! Stored data may predate the current model (no `id`, no `openingBalance`,
//! `account` instead of `accountId`, numeric ids). These records accept all of
//! it and are converted into the strict model types after loading.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::account::{Account, DEFAULT_ACCOUNT_KIND};
use crate::models::category::ExpenseCategory;
use crate::models::transaction::{Transaction, TransactionKind, DEFAULT_INCOME_SOURCE};

/// A number that may have been stored as a JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredNumber {
    Number(f64),
    Text(String),
}

impl StoredNumber {
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            StoredNumber::Number(n) => *n,
            StoredNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// An id that may have been stored as a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredId {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl StoredId {
    pub fn into_string(self) -> Option<String> {
        let id = match self {
            StoredId::Text(s) => s.trim().to_string(),
            StoredId::Integer(n) => n.to_string(),
            StoredId::Number(n) if n.is_finite() => n.to_string(),
            StoredId::Number(_) => return None,
        };
        (!id.is_empty()).then_some(id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAccount {
    #[serde(default)]
    pub id: Option<StoredId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub opening_balance: Option<StoredNumber>,
    #[serde(default)]
    pub balance: Option<StoredNumber>,
}

impl StoredAccount {
    /// Convert to an [`Account`]. The second value is `true` when the opening
    /// balance was absent and still has to be derived from the transactions.
    ///
    /// Records with neither a name nor an id are unusable.
    pub fn into_account(self) -> Option<(Account, bool)> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let id = self.id.and_then(StoredId::into_string);
        let (id, name) = match (id, name) {
            (Some(id), Some(name)) => (id, name),
            (None, Some(name)) => (name.clone(), name),
            (Some(id), None) => (id.clone(), id),
            (None, None) => return None,
        };

        let balance = self.balance.as_ref().and_then(StoredNumber::value).unwrap_or(0.0);
        let opening = self.opening_balance.as_ref().and_then(StoredNumber::value);
        let kind = self
            .kind
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_ACCOUNT_KIND.to_string());

        let account = Account {
            id,
            name,
            kind,
            color: self.color.filter(|c| !c.trim().is_empty()),
            opening_balance: opening.unwrap_or(balance),
            balance,
        };
        Some((account, opening.is_none()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    #[serde(default)]
    pub id: Option<StoredId>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    /// Older records named the account reference `account`.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub amount: Option<StoredNumber>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl StoredTransaction {
    /// Convert to a [`Transaction`], or explain why the record is unusable.
    pub fn into_transaction(self) -> Result<Transaction, String> {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some(k) if k.eq_ignore_ascii_case("income") => TransactionKind::Income {
                source: self
                    .source
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_INCOME_SOURCE.to_string()),
            },
            Some(k) if k.eq_ignore_ascii_case("expense") => TransactionKind::Expense {
                category: self
                    .category
                    .as_deref()
                    .map(ExpenseCategory::parse)
                    .unwrap_or_default(),
            },
            other => return Err(format!("unknown transaction type {other:?}")),
        };

        let account_id = self
            .account_id
            .or(self.account)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or("missing account reference")?;

        let amount = self
            .amount
            .as_ref()
            .and_then(StoredNumber::value)
            .filter(|a| *a > 0.0)
            .ok_or("missing or non-positive amount")?;

        let date = self
            .date
            .as_deref()
            .and_then(parse_stored_date)
            .ok_or("missing or unreadable date")?;

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| kind.default_title().to_string());

        let id = self
            .id
            .and_then(StoredId::into_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Transaction {
            id,
            kind,
            account_id,
            amount,
            title,
            date,
        })
    }
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates (read as midnight UTC).
pub fn parse_stored_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let utc = FixedOffset::east_opt(0)?;
    day.and_time(NaiveTime::MIN).and_local_timezone(utc).single()
}
