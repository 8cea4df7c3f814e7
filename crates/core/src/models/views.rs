use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::ExpenseCategory;
use super::transaction::Transaction;
use crate::services::currency_service::format_money;

/// Short month labels for the year chart, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A transaction together with its amount in the display currency.
///
/// The core computes the numbers; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// The stored transaction (base-currency amount).
    pub transaction: Transaction,

    /// `transaction.amount` converted to the view's currency
    pub display_amount: f64,
}

/// Expense total for one category, in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
}

/// The "Today" dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayView {
    pub date: NaiveDate,

    /// Currency every amount in this view is expressed in
    pub currency: String,

    /// Today's transactions, newest first
    pub transactions: Vec<TransactionRow>,

    /// Expense totals for [`ExpenseCategory::CHARTED`], in that order
    pub category_totals: Vec<CategoryTotal>,

    /// Sum of the balances of the filtered accounts
    pub total_balance: f64,

    /// Expenses over the whole current calendar month
    pub month_spending: f64,

    /// False when the doughnut chart has nothing to show
    pub has_expenses: bool,
}

/// Current month's spending against the previous month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonthComparison {
    /// Nothing spent in either month.
    NoExpenses,
    /// Spending this month, nothing recorded last month.
    NoPreviousData { current: f64 },
    Increase { difference: f64, percent: f64 },
    Decrease { difference: f64, percent: f64 },
    Same,
}

impl MonthComparison {
    /// Human-readable summary using `format` to render amounts.
    pub fn message(&self, format: impl Fn(f64) -> String) -> String {
        match self {
            MonthComparison::NoExpenses => "No expenses recorded.".to_string(),
            MonthComparison::NoPreviousData { current } => format!(
                "Spent {} this month. No data for last month.",
                format(*current)
            ),
            MonthComparison::Increase { difference, .. } => {
                format!("Spent {} more than last month.", format(*difference))
            }
            MonthComparison::Decrease { difference, .. } => {
                format!("Spent {} less than last month.", format(*difference))
            }
            MonthComparison::Same => "Spent exactly the same as last month.".to_string(),
        }
    }
}

/// The monthly overview for one (year, month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,

    /// 1-based month
    pub month: u32,

    pub currency: String,

    /// Transactions in the month, newest first
    pub transactions: Vec<TransactionRow>,

    /// Expense sum per day; index 0 is the 1st, length is the month's day count
    pub daily_expenses: Vec<f64>,

    /// Expense totals for [`ExpenseCategory::CHARTED`], in that order
    pub category_totals: Vec<CategoryTotal>,

    pub total_expense: f64,

    pub total_income: f64,

    /// Expenses in the preceding calendar month, same account filter
    pub previous_month_expense: f64,

    pub comparison: MonthComparison,
}

impl MonthView {
    pub fn days_in_month(&self) -> usize {
        self.daily_expenses.len()
    }

    /// Comparison sentence with amounts formatted in the view's currency.
    pub fn comparison_text(&self) -> String {
        self.comparison
            .message(|value| format_money(value, &self.currency))
    }
}

/// The yearly overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearView {
    pub year: i32,

    pub currency: String,

    /// Transactions in the year, newest first
    pub transactions: Vec<TransactionRow>,

    /// Expense sum per month, January first (always 12 entries)
    pub monthly_expenses: Vec<f64>,

    /// Expense totals for the categories present in the data, first-seen order
    pub category_totals: Vec<CategoryTotal>,

    pub total_income: f64,

    pub total_expense: f64,

    /// total_income - total_expense
    pub net: f64,

    pub has_expenses: bool,
}

impl YearView {
    /// `(label, expense)` pairs for the monthly bar chart.
    pub fn monthly_series(&self) -> Vec<(&'static str, f64)> {
        MONTH_LABELS
            .iter()
            .copied()
            .zip(self.monthly_expenses.iter().copied())
            .collect()
    }
}

/// Drill-down into one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub currency: String,
    /// Newest first by full timestamp
    pub transactions: Vec<TransactionRow>,
    pub total_expense: f64,
    pub total_income: f64,
}

/// An account with its balance in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub kind: String,
    pub balance: f64,
    pub currency: String,
}
