use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};

use crate::models::account::NewAccount;
use crate::models::category::ExpenseCategory;
use crate::models::transaction::NewTransaction;

pub const SAMPLE_INCOME_SOURCE: &str = "Salary/Freelance";

/// Expenses generated per month.
const EXPENSES_PER_MONTH: u32 = 4;

/// Accounts created when seeding an empty ledger. The first one receives
/// the generated transactions.
pub fn sample_accounts() -> Vec<NewAccount> {
    vec![
        NewAccount::new("HDFC Bank").with_opening_balance(50_000.0),
        NewAccount::new("Cash").with_kind("Cash").with_opening_balance(5_000.0),
    ]
}

/// Demo transactions for `account_id` from January of `today`'s year up to
/// `today`, one salary and a few expenses per month.
///
/// The pattern is deterministic and never produces a date after `today`.
/// `stamp` turns a wall-clock time into a timestamp; times it rejects are
/// skipped.
pub fn sample_transactions(
    account_id: &str,
    today: NaiveDate,
    stamp: impl Fn(NaiveDateTime) -> Option<DateTime<FixedOffset>>,
) -> Vec<NewTransaction> {
    let mut out = Vec::new();

    for month in 1..=today.month() {
        let last_day = if month == today.month() { today.day() } else { 28 };

        if let Some(date) = at(today.year(), month, 1, 10, 0).and_then(&stamp) {
            out.push(
                NewTransaction::income(account_id, 30_000.0, SAMPLE_INCOME_SOURCE)
                    .with_title("Demo Income")
                    .at(date),
            );
        }

        for i in 0..EXPENSES_PER_MONTH {
            let category =
                ExpenseCategory::CHARTED[((month + i) as usize) % ExpenseCategory::CHARTED.len()].clone();
            let day = 1 + (month * 7 + i * 5) % last_day;
            let hour = (9 + i * 3 + month) % 24;
            let amount = 100.0 + f64::from((month * 37 + i * 53) % 19) * 100.0;

            if let Some(date) = at(today.year(), month, day, hour, (i * 15) % 60).and_then(&stamp) {
                let title = format!("Demo {category}");
                out.push(
                    NewTransaction::expense(account_id, amount, category)
                        .with_title(title)
                        .at(date),
                );
            }
        }
    }

    out
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}
