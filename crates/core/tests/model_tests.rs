// ═══════════════════════════════════════════════════════════════════
// Model Tests - Account, Transaction, ExpenseCategory, Preferences,
// ExchangeRates, views, TrackerConfig
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use finance_tracker_core::config::{TrackerConfig, DEFAULT_BASE_CURRENCY};
use finance_tracker_core::models::account::{Account, NewAccount};
use finance_tracker_core::models::category::ExpenseCategory;
use finance_tracker_core::models::preferences::{normalize_account_filter, Preferences, Theme};
use finance_tracker_core::models::rates::ExchangeRates;
use finance_tracker_core::models::transaction::{
    NewTransaction, Transaction, TransactionKind, DEFAULT_INCOME_SOURCE,
};
use finance_tracker_core::models::views::MonthComparison;

fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(5 * 3600 + 1800)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// ExpenseCategory
// ═══════════════════════════════════════════════════════════════════

mod expense_category {
    use super::*;

    #[test]
    fn charted_set_order() {
        let labels: Vec<String> = ExpenseCategory::CHARTED.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            vec!["Food", "Travelling", "Shopping", "Groceries", "Recharge", "Cosmetics"]
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ExpenseCategory::parse("food"), ExpenseCategory::Food);
        assert_eq!(ExpenseCategory::parse("  GROCERIES "), ExpenseCategory::Groceries);
    }

    #[test]
    fn blank_becomes_uncategorized() {
        assert_eq!(ExpenseCategory::parse(""), ExpenseCategory::Uncategorized);
        assert_eq!(ExpenseCategory::parse("  "), ExpenseCategory::Uncategorized);
        assert_eq!(ExpenseCategory::parse("uncategorized"), ExpenseCategory::Uncategorized);
        assert_eq!(ExpenseCategory::default(), ExpenseCategory::Uncategorized);
    }

    #[test]
    fn unknown_label_is_kept() {
        let rent = ExpenseCategory::parse(" Rent ");
        assert_eq!(rent, ExpenseCategory::Other("Rent".into()));
        assert_eq!(rent.label(), "Rent");
        assert!(!rent.is_charted());
        assert!(ExpenseCategory::Food.is_charted());
        assert!(!ExpenseCategory::Uncategorized.is_charted());
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_string(&ExpenseCategory::Travelling).unwrap();
        assert_eq!(json, "\"Travelling\"");
        let back: ExpenseCategory = serde_json::from_str("\"Bills\"").unwrap();
        assert_eq!(back, ExpenseCategory::Other("Bills".into()));
        assert_eq!(serde_json::to_string(&back).unwrap(), "\"Bills\"");
    }

    #[test]
    fn display_matches_label() {
        assert_eq!(ExpenseCategory::Cosmetics.to_string(), "Cosmetics");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Transaction
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    #[test]
    fn signed_amount_follows_kind() {
        let income = Transaction::new(TransactionKind::income("Salary"), "Bank", 500.0, "Pay", ist(2024, 3, 5, 9, 0));
        let expense = Transaction::new(TransactionKind::expense("Food"), "Bank", 100.0, "Lunch", ist(2024, 3, 5, 13, 0));
        assert_eq!(income.signed_amount(), 500.0);
        assert_eq!(expense.signed_amount(), -100.0);
        assert!(income.is_income());
        assert!(expense.is_expense());
    }

    #[test]
    fn ids_are_unique() {
        let a = Transaction::new(TransactionKind::income("x"), "Bank", 1.0, "a", ist(2024, 1, 1, 0, 0));
        let b = Transaction::new(TransactionKind::income("x"), "Bank", 1.0, "a", ist(2024, 1, 1, 0, 0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn variant_accessors() {
        let expense = Transaction::new(TransactionKind::expense(ExpenseCategory::Food), "Bank", 1.0, "t", ist(2024, 1, 1, 0, 0));
        assert_eq!(expense.category(), Some(&ExpenseCategory::Food));
        assert_eq!(expense.source(), None);

        let income = Transaction::new(TransactionKind::income("Gift"), "Bank", 1.0, "t", ist(2024, 1, 1, 0, 0));
        assert_eq!(income.category(), None);
        assert_eq!(income.source(), Some("Gift"));
    }

    #[test]
    fn calendar_date_depends_on_viewing_zone() {
        // 00:30 IST on the 6th is still the 5th in UTC.
        let tx = Transaction::new(TransactionKind::expense("Food"), "Bank", 1.0, "t", ist(2024, 3, 6, 0, 30));
        let ist_zone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(tx.date_in(&ist_zone), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(tx.date_in(&Utc), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(tx.local_date(), tx.date_in(&chrono::Local));
    }

    #[test]
    fn serializes_with_type_tag_and_camel_case() {
        let tx = Transaction::new(TransactionKind::expense("Food"), "Bank", 100.0, "Lunch", ist(2024, 3, 5, 13, 0));
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["category"], "Food");
        assert_eq!(value["accountId"], "Bank");
        assert_eq!(value["date"], "2024-03-05T13:00:00+05:30");
        assert!(value.get("source").is_none());
    }

    #[test]
    fn income_without_source_deserializes_with_default() {
        let json = r#"{"id":"1","type":"income","accountId":"Bank","amount":10.0,"title":"t","date":"2024-03-05T10:00:00Z"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.source(), Some(DEFAULT_INCOME_SOURCE));
    }

    #[test]
    fn kind_display_and_default_title() {
        assert_eq!(TransactionKind::income("x").to_string(), "income");
        assert_eq!(TransactionKind::expense("Food").default_title(), "Expense");
        assert_eq!(TransactionKind::income("x").default_title(), "Income");
    }

    #[test]
    fn new_transaction_builders() {
        let data = NewTransaction::expense("Bank", 42.0, "Food")
            .with_title("Dinner")
            .at(ist(2024, 3, 5, 20, 0));
        assert_eq!(data.account_id, "Bank");
        assert_eq!(data.title.as_deref(), Some("Dinner"));
        assert_eq!(data.date, Some(ist(2024, 3, 5, 20, 0)));
        assert_eq!(data.kind, TransactionKind::expense(ExpenseCategory::Food));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Account
// ═══════════════════════════════════════════════════════════════════

mod account {
    use super::*;

    #[test]
    fn new_account_builder() {
        let data = NewAccount::new("Wallet")
            .with_kind("Cash")
            .with_opening_balance(250.0)
            .with_color("#00b894");
        assert_eq!(data.name, "Wallet");
        assert_eq!(data.kind, "Cash");
        assert_eq!(data.opening_balance, Some(250.0));
        assert_eq!(data.color.as_deref(), Some("#00b894"));
    }

    #[test]
    fn serializes_kind_as_type() {
        let account = Account {
            id: "Wallet".into(),
            name: "Wallet".into(),
            kind: "Cash".into(),
            color: None,
            opening_balance: 10.0,
            balance: 12.5,
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["type"], "Cash");
        assert_eq!(value["openingBalance"], 10.0);
        assert!(value.get("color").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Preferences
// ═══════════════════════════════════════════════════════════════════

mod preferences {
    use super::*;

    #[test]
    fn defaults() {
        let p = Preferences::default();
        assert_eq!(p.currency, DEFAULT_BASE_CURRENCY);
        assert_eq!(p.active_account, None);
        assert_eq!(p.theme, Theme::Dark);
    }

    #[test]
    fn theme_parse_and_toggle() {
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().as_str(), "dark");
    }

    #[test]
    fn account_filter_normalization() {
        assert_eq!(normalize_account_filter(None), None);
        assert_eq!(normalize_account_filter(Some("")), None);
        assert_eq!(normalize_account_filter(Some("all")), None);
        assert_eq!(normalize_account_filter(Some("ALL")), None);
        assert_eq!(normalize_account_filter(Some(" Bank ")), Some("Bank".to_string()));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ExchangeRates
// ═══════════════════════════════════════════════════════════════════

mod exchange_rates {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_by_default() {
        let rates = ExchangeRates::default();
        assert!(rates.is_empty());
        assert_eq!(rates.rate("USD"), None);
    }

    #[test]
    fn untrusted_values_are_dropped() {
        let rates = ExchangeRates::new("inr")
            .with_rate("USD", 0.012)
            .with_rate("BAD", 0.0)
            .with_rate("NEG", -1.0)
            .with_rate("NAN", f64::NAN)
            .with_rate("INF", f64::INFINITY);
        assert_eq!(rates.anchor, "INR");
        assert_eq!(rates.len(), 1);
        assert_eq!(rates.rate("usd"), Some(0.012));
    }

    #[test]
    fn from_rates_and_sorted_codes() {
        let mut raw = HashMap::new();
        raw.insert("usd".to_string(), 1.0);
        raw.insert("EUR".to_string(), 0.9);
        raw.insert("XXX".to_string(), f64::NAN);
        let rates = ExchangeRates::from_rates("USD", raw);
        assert_eq!(rates.codes(), vec!["EUR", "USD"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Views
// ═══════════════════════════════════════════════════════════════════

mod views {
    use super::*;

    #[test]
    fn comparison_messages() {
        let fmt = |v: f64| format!("{v:.0}");
        assert_eq!(MonthComparison::NoExpenses.message(fmt), "No expenses recorded.");
        assert_eq!(
            MonthComparison::NoPreviousData { current: 150.0 }.message(fmt),
            "Spent 150 this month. No data for last month."
        );
        assert_eq!(
            MonthComparison::Increase { difference: 100.0, percent: 50.0 }.message(fmt),
            "Spent 100 more than last month."
        );
        assert_eq!(
            MonthComparison::Decrease { difference: 20.0, percent: 10.0 }.message(fmt),
            "Spent 20 less than last month."
        );
        assert_eq!(MonthComparison::Same.message(fmt), "Spent exactly the same as last month.");
    }
}

// ═══════════════════════════════════════════════════════════════════
// TrackerConfig
// ═══════════════════════════════════════════════════════════════════

mod config {
    use super::*;

    #[test]
    fn defaults() {
        let c = TrackerConfig::default();
        assert_eq!(c.base_currency, "INR");
        assert_eq!(c.storage_prefix, "finance_");
        assert_eq!(c.request_timeout_secs, 30);
        assert_eq!(c.storage_key("accounts"), "finance_accounts");
        assert_eq!(c.utc_offset(), None);
    }

    #[test]
    fn utc_offset_from_minutes() {
        let c = TrackerConfig::from_json(r#"{"utc_offset_minutes": 330}"#).unwrap();
        assert_eq!(c.utc_offset(), FixedOffset::east_opt(5 * 3600 + 1800));

        let west = TrackerConfig::from_json(r#"{"utc_offset_minutes": -300}"#).unwrap();
        assert_eq!(west.utc_offset(), FixedOffset::west_opt(5 * 3600));

        let out_of_range = TrackerConfig {
            utc_offset_minutes: Some(24 * 60),
            ..TrackerConfig::default()
        };
        assert_eq!(out_of_range.utc_offset(), None);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let c = TrackerConfig::from_json(r#"{"base_currency":"usd","storage_prefix":"t_"}"#).unwrap();
        assert_eq!(c.base_currency, "USD");
        assert_eq!(c.storage_key("theme"), "t_theme");
        assert_eq!(c.frankfurter_url, TrackerConfig::default().frankfurter_url);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(TrackerConfig::from_json("not json").is_err());
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = TrackerConfig::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(c, TrackerConfig::default());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        std::fs::write(&path, r#"{"request_timeout_secs": 5}"#).unwrap();
        let c = TrackerConfig::load(&path).unwrap();
        assert_eq!(c.request_timeout_secs, 5);
        assert_eq!(c.base_currency, "INR");
    }
}
