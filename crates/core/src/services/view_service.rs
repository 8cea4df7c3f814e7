use chrono::{Datelike, FixedOffset, NaiveDate};

use crate::errors::CoreError;
use crate::models::category::ExpenseCategory;
use crate::models::ledger::Ledger;
use crate::models::rates::ExchangeRates;
use crate::models::transaction::Transaction;
use crate::models::views::{
    AccountBalance, CategoryTotal, DayView, MonthComparison, MonthView, TodayView,
    TransactionRow, YearView,
};
use crate::services::currency_service::CurrencyService;

/// Relative tolerance under which two monthly totals count as equal.
const COMPARISON_TOLERANCE: f64 = 1e-9;

/// What a view reads: the ledger, the rate table, the display currency, an
/// optional account filter and the timezone calendar days are cut in.
#[derive(Debug, Clone, Copy)]
pub struct ViewScope<'a> {
    pub ledger: &'a Ledger,
    pub rates: &'a ExchangeRates,
    pub currency: &'a str,
    /// `None` means all accounts.
    pub account: Option<&'a str>,
    /// `None` means the system's local timezone.
    pub utc_offset: Option<FixedOffset>,
}

impl<'a> ViewScope<'a> {
    pub fn new(ledger: &'a Ledger, rates: &'a ExchangeRates, currency: &'a str) -> Self {
        Self {
            ledger,
            rates,
            currency,
            account: None,
            utc_offset: None,
        }
    }

    pub fn for_account(mut self, account: Option<&'a str>) -> Self {
        self.account = account;
        self
    }

    pub fn with_utc_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Calendar day a transaction falls on in this scope's timezone.
    pub fn calendar_date(&self, t: &Transaction) -> NaiveDate {
        match &self.utc_offset {
            Some(offset) => t.date_in(offset),
            None => t.local_date(),
        }
    }

    fn in_month(&self, t: &Transaction, year: i32, month: u32) -> bool {
        let date = self.calendar_date(t);
        date.year() == year && date.month() == month
    }
}

/// Builds the today / month / year / day projections of the ledger.
///
/// Every amount in a view is in the display currency: each transaction is
/// converted on its own and the converted values are summed. Conversion is a
/// per-element linear scale, so this equals converting the base-currency sum.
pub struct ViewService {
    currency_service: CurrencyService,
}

impl ViewService {
    pub fn new(currency_service: CurrencyService) -> Self {
        Self { currency_service }
    }

    /// Transactions on `today`, the fixed-category breakdown, the filtered
    /// balance and the spending of `today`'s month.
    pub fn today(&self, scope: ViewScope<'_>, today: NaiveDate) -> TodayView {
        let day: Vec<&Transaction> = self
            .scoped(scope)
            .filter(|t| scope.calendar_date(t) == today)
            .collect();

        let category_totals = self.charted_category_totals(scope, &day);
        let has_expenses = category_totals.iter().any(|c| c.total > 0.0);

        let month_spending = self
            .scoped(scope)
            .filter(|t| t.is_expense() && scope.in_month(t, today.year(), today.month()))
            .map(|t| self.display(scope, t.amount))
            .sum();

        TodayView {
            date: today,
            currency: self.currency_code(scope),
            transactions: self.rows(scope, day),
            category_totals,
            total_balance: self.total_balance(scope),
            month_spending,
            has_expenses,
        }
    }

    /// Monthly overview for `month` (1-12) of `year`, compared with the
    /// preceding calendar month under the same account filter.
    pub fn month(&self, scope: ViewScope<'_>, year: i32, month: u32) -> Result<MonthView, CoreError> {
        let days = days_in_month(year, month).ok_or_else(|| {
            CoreError::Validation(format!("Invalid month {year}-{month:02}"))
        })?;

        let in_window: Vec<&Transaction> = self
            .scoped(scope)
            .filter(|t| scope.in_month(t, year, month))
            .collect();

        let mut daily_expenses = vec![0.0; days as usize];
        let mut total_expense = 0.0;
        let mut total_income = 0.0;
        for t in &in_window {
            let value = self.display(scope, t.amount);
            if t.is_expense() {
                daily_expenses[scope.calendar_date(t).day0() as usize] += value;
                total_expense += value;
            } else {
                total_income += value;
            }
        }

        let (prev_year, prev_month) = previous_month(year, month);
        let previous_month_expense = self
            .scoped(scope)
            .filter(|t| t.is_expense() && scope.in_month(t, prev_year, prev_month))
            .map(|t| self.display(scope, t.amount))
            .sum();

        Ok(MonthView {
            year,
            month,
            currency: self.currency_code(scope),
            category_totals: self.charted_category_totals(scope, &in_window),
            transactions: self.rows(scope, in_window),
            daily_expenses,
            total_expense,
            total_income,
            previous_month_expense,
            comparison: compare_months(total_expense, previous_month_expense),
        })
    }

    /// Yearly overview. Categories come from the data itself, not the fixed
    /// chart set, since older records may use categories no longer charted.
    pub fn year(&self, scope: ViewScope<'_>, year: i32) -> YearView {
        let in_window: Vec<&Transaction> = self
            .scoped(scope)
            .filter(|t| scope.calendar_date(t).year() == year)
            .collect();

        let mut monthly_expenses = vec![0.0; 12];
        let mut category_totals: Vec<CategoryTotal> = Vec::new();
        let mut total_income = 0.0;
        let mut total_expense = 0.0;

        for t in &in_window {
            let value = self.display(scope, t.amount);
            match t.category() {
                Some(category) => {
                    monthly_expenses[scope.calendar_date(t).month0() as usize] += value;
                    total_expense += value;
                    match category_totals.iter_mut().find(|c| &c.category == category) {
                        Some(entry) => entry.total += value,
                        None => category_totals.push(CategoryTotal {
                            category: category.clone(),
                            total: value,
                        }),
                    }
                }
                None => total_income += value,
            }
        }

        YearView {
            year,
            currency: self.currency_code(scope),
            transactions: self.rows(scope, in_window),
            has_expenses: total_expense > 0.0,
            monthly_expenses,
            category_totals,
            total_income,
            total_expense,
            net: total_income - total_expense,
        }
    }

    /// Every transaction on `date`, newest first by full timestamp.
    pub fn day(&self, scope: ViewScope<'_>, date: NaiveDate) -> DayView {
        let on_day: Vec<&Transaction> = self
            .scoped(scope)
            .filter(|t| scope.calendar_date(t) == date)
            .collect();

        let (mut total_expense, mut total_income) = (0.0, 0.0);
        for t in &on_day {
            let value = self.display(scope, t.amount);
            if t.is_expense() {
                total_expense += value;
            } else {
                total_income += value;
            }
        }

        DayView {
            date,
            currency: self.currency_code(scope),
            transactions: self.rows(scope, on_day),
            total_expense,
            total_income,
        }
    }

    /// All accounts with their balance in the display currency.
    /// Ignores the scope's account filter.
    pub fn account_balances(&self, scope: ViewScope<'_>) -> Vec<AccountBalance> {
        let currency = self.currency_code(scope);
        scope
            .ledger
            .accounts
            .iter()
            .map(|a| AccountBalance {
                account_id: a.id.clone(),
                name: a.name.clone(),
                kind: a.kind.clone(),
                balance: self.display(scope, a.balance),
                currency: currency.clone(),
            })
            .collect()
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Transactions passing the account filter.
    fn scoped<'a>(&self, scope: ViewScope<'a>) -> impl Iterator<Item = &'a Transaction> + 'a {
        let account = scope.account;
        scope
            .ledger
            .transactions
            .iter()
            .filter(move |t| account.map_or(true, |id| t.account_id == id))
    }

    fn display(&self, scope: ViewScope<'_>, amount: f64) -> f64 {
        self.currency_service
            .convert(amount, scope.rates, scope.currency)
            .value
    }

    fn currency_code(&self, scope: ViewScope<'_>) -> String {
        self.currency_service
            .effective_code(scope.rates, scope.currency)
    }

    fn rows(&self, scope: ViewScope<'_>, transactions: Vec<&Transaction>) -> Vec<TransactionRow> {
        let mut rows: Vec<TransactionRow> = transactions
            .into_iter()
            .map(|t| TransactionRow {
                transaction: t.clone(),
                display_amount: self.display(scope, t.amount),
            })
            .collect();
        rows.sort_by(|a, b| b.transaction.date.cmp(&a.transaction.date));
        rows
    }

    fn charted_category_totals(
        &self,
        scope: ViewScope<'_>,
        transactions: &[&Transaction],
    ) -> Vec<CategoryTotal> {
        ExpenseCategory::CHARTED
            .into_iter()
            .map(|category| CategoryTotal {
                total: transactions
                    .iter()
                    .filter(|t| t.category() == Some(&category))
                    .map(|t| self.display(scope, t.amount))
                    .sum(),
                category,
            })
            .collect()
    }

    fn total_balance(&self, scope: ViewScope<'_>) -> f64 {
        scope
            .ledger
            .accounts
            .iter()
            .filter(|a| scope.account.map_or(true, |id| a.id == id))
            .map(|a| self.display(scope, a.balance))
            .sum()
    }
}

/// Number of days in `month` (1-12) of `year`; `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((next - first).num_days() as u32)
}

/// The calendar month before (year, month).
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Classify this month's spending against last month's.
pub fn compare_months(current: f64, previous: f64) -> MonthComparison {
    if previous.abs() <= COMPARISON_TOLERANCE {
        return if current.abs() <= COMPARISON_TOLERANCE {
            MonthComparison::NoExpenses
        } else {
            MonthComparison::NoPreviousData { current }
        };
    }

    let difference = current - previous;
    if difference.abs() <= COMPARISON_TOLERANCE * previous.abs().max(1.0) {
        return MonthComparison::Same;
    }

    let percent = difference.abs() / previous * 100.0;
    if difference > 0.0 {
        MonthComparison::Increase {
            difference,
            percent,
        }
    } else {
        MonthComparison::Decrease {
            difference: difference.abs(),
            percent,
        }
    }
}
