pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use config::TrackerConfig;
use errors::CoreError;
use models::{
    account::{Account, BalanceMismatch, NewAccount},
    ledger::Ledger,
    preferences::{normalize_account_filter, Preferences, Theme},
    rates::ExchangeRates,
    transaction::{NewTransaction, Transaction},
    views::{AccountBalance, DayView, MonthView, TodayView, YearView},
};
use providers::registry::RateProviderRegistry;
use services::{
    currency_service::{CurrencyService, Money},
    ledger_service::LedgerService,
    rate_service::RateService,
    sample_data,
    view_service::{ViewScope, ViewService},
};
use storage::{
    manager::{is_currency_code, StorageManager},
    store::{KeyValueStore, MemoryStore},
};

/// Main entry point for the finance tracker core library.
///
/// Owns the ledger, the user preferences, the current exchange-rate table and
/// the store they persist to. Every mutation is written through to the store
/// before the call returns.
#[must_use]
pub struct FinanceTracker {
    ledger: Ledger,
    preferences: Preferences,
    rates: ExchangeRates,
    config: TrackerConfig,
    ledger_service: LedgerService,
    view_service: ViewService,
    currency_service: CurrencyService,
    rate_service: RateService,
    storage: StorageManager,
    store: Box<dyn KeyValueStore>,
    /// Set when the last write-through failed; cleared by a successful save.
    dirty: bool,
}

impl std::fmt::Debug for FinanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceTracker")
            .field("accounts", &self.ledger.accounts.len())
            .field("transactions", &self.ledger.transactions.len())
            .field("preferences", &self.preferences)
            .field("rates", &self.rates.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FinanceTracker {
    /// Hydrate a tracker from `store`.
    ///
    /// Never fails: unreadable data is logged and replaced with defaults.
    pub fn open(store: Box<dyn KeyValueStore>, config: TrackerConfig) -> Self {
        let storage = StorageManager::new(&config);
        let (ledger, preferences) = storage.hydrate(store.as_ref());
        let registry = RateProviderRegistry::new_with_defaults(&config);
        let currency_service = CurrencyService::new(config.base_currency.clone());

        Self {
            ledger,
            preferences,
            rates: ExchangeRates::default(),
            ledger_service: LedgerService::new(),
            view_service: ViewService::new(currency_service.clone()),
            currency_service,
            rate_service: RateService::new(registry),
            storage,
            store,
            config,
            dirty: false,
        }
    }

    /// Empty tracker backed by a [`MemoryStore`], default configuration.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()), TrackerConfig::default())
    }

    /// Replace the rate provider chain (e.g. with offline or mock providers).
    pub fn with_rate_registry(mut self, registry: RateProviderRegistry) -> Self {
        self.set_rate_registry(registry);
        self
    }

    pub fn set_rate_registry(&mut self, registry: RateProviderRegistry) {
        self.rate_service = RateService::new(registry);
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Create an account. Names must be unique.
    pub fn add_account(&mut self, data: NewAccount) -> Result<Account, CoreError> {
        let account = self.ledger_service.add_account(&mut self.ledger, data)?;
        self.write_through()?;
        Ok(account)
    }

    /// Delete an account that no transaction references.
    ///
    /// Clears the active-account preference if it pointed here.
    pub fn delete_account(&mut self, account_id: &str) -> Result<Account, CoreError> {
        let account = self.ledger_service.delete_account(&mut self.ledger, account_id)?;
        if self.preferences.active_account.as_deref() == Some(account.id.as_str()) {
            self.preferences.active_account = None;
        }
        self.write_through()?;
        Ok(account)
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.ledger.accounts
    }

    #[must_use]
    pub fn account(&self, account_id: &str) -> Option<&Account> {
        self.ledger.account(account_id)
    }

    /// Display name of an account, or a placeholder for unknown ids.
    #[must_use]
    pub fn account_name(&self, account_id: &str) -> String {
        self.ledger_service.account_name(&self.ledger, account_id)
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Record an income or expense and adjust its account's balance.
    pub fn add_transaction(&mut self, mut data: NewTransaction) -> Result<Transaction, CoreError> {
        if data.date.is_none() {
            data.date = Some(self.now());
        }
        let transaction = self.ledger_service.add_transaction(&mut self.ledger, data)?;
        self.write_through()?;
        Ok(transaction)
    }

    /// Remove a transaction and reverse its balance effect.
    /// Unknown ids are a no-op returning `Ok(None)`.
    pub fn delete_transaction(&mut self, transaction_id: &str) -> Result<Option<Transaction>, CoreError> {
        let removed = self
            .ledger_service
            .delete_transaction(&mut self.ledger, transaction_id);
        if removed.is_some() {
            self.write_through()?;
        }
        Ok(removed)
    }

    /// All transactions in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    #[must_use]
    pub fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.ledger.transaction(transaction_id)
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ── Balances ────────────────────────────────────────────────────

    /// Per-account balances in the display currency.
    #[must_use]
    pub fn account_balances(&self) -> Vec<AccountBalance> {
        self.view_service.account_balances(self.scope(None))
    }

    /// Accounts whose stored balance disagrees with their transactions.
    #[must_use]
    pub fn verify_balances(&self) -> Vec<BalanceMismatch> {
        self.ledger_service.verify_balances(&self.ledger)
    }

    /// Recompute drifted balances from the transactions and persist the fix.
    pub fn reconcile_balances(&mut self) -> Result<Vec<BalanceMismatch>, CoreError> {
        let fixed = self.ledger_service.reconcile_balances(&mut self.ledger);
        if !fixed.is_empty() {
            self.write_through()?;
        }
        Ok(fixed)
    }

    // ── Views ───────────────────────────────────────────────────────
    //
    // The plain variants filter by the active-account preference and use the
    // local calendar; the `_for` variants take both explicitly.

    #[must_use]
    pub fn today_view(&self) -> TodayView {
        let active = self.preferences.active_account.clone();
        self.today_view_for(active.as_deref(), self.today())
    }

    #[must_use]
    pub fn today_view_for(&self, account: Option<&str>, today: NaiveDate) -> TodayView {
        let filter = normalize_account_filter(account);
        self.view_service.today(self.scope(filter.as_deref()), today)
    }

    /// Month view; `month` is 1-based.
    pub fn month_view(&self, year: i32, month: u32) -> Result<MonthView, CoreError> {
        let active = self.preferences.active_account.clone();
        self.month_view_for(active.as_deref(), year, month)
    }

    pub fn month_view_for(
        &self,
        account: Option<&str>,
        year: i32,
        month: u32,
    ) -> Result<MonthView, CoreError> {
        let filter = normalize_account_filter(account);
        self.view_service.month(self.scope(filter.as_deref()), year, month)
    }

    #[must_use]
    pub fn year_view(&self, year: i32) -> YearView {
        let active = self.preferences.active_account.clone();
        self.year_view_for(active.as_deref(), year)
    }

    #[must_use]
    pub fn year_view_for(&self, account: Option<&str>, year: i32) -> YearView {
        let filter = normalize_account_filter(account);
        self.view_service.year(self.scope(filter.as_deref()), year)
    }

    /// Drill-down for one calendar day, newest first.
    #[must_use]
    pub fn day_view(&self, date: NaiveDate) -> DayView {
        let active = self.preferences.active_account.clone();
        self.day_view_for(active.as_deref(), date)
    }

    #[must_use]
    pub fn day_view_for(&self, account: Option<&str>, date: NaiveDate) -> DayView {
        let filter = normalize_account_filter(account);
        self.view_service.day(self.scope(filter.as_deref()), date)
    }

    // ── Currency ────────────────────────────────────────────────────

    /// Convert a base-currency amount into the display currency.
    #[must_use]
    pub fn convert(&self, amount: f64) -> Money {
        self.currency_service
            .convert(amount, &self.rates, &self.preferences.currency)
    }

    /// Convert and format a base-currency amount for display.
    #[must_use]
    pub fn format_amount(&self, amount: f64) -> String {
        self.currency_service
            .format_base_amount(amount, &self.rates, &self.preferences.currency)
    }

    /// Convert an amount typed in the display currency back to base.
    #[must_use]
    pub fn to_base(&self, display_value: f64) -> f64 {
        self.currency_service
            .to_base(display_value, &self.rates, &self.preferences.currency)
    }

    /// The selected display currency.
    #[must_use]
    pub fn display_currency(&self) -> &str {
        &self.preferences.currency
    }

    /// The currency amounts actually render in: the base currency until a
    /// rate for the display currency is known.
    #[must_use]
    pub fn effective_currency(&self) -> String {
        self.currency_service
            .effective_code(&self.rates, &self.preferences.currency)
    }

    #[must_use]
    pub fn base_currency(&self) -> &str {
        self.currency_service.base_currency()
    }

    // ── Exchange Rates ──────────────────────────────────────────────

    #[must_use]
    pub fn exchange_rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// Install a rate table fetched elsewhere.
    pub fn set_exchange_rates(&mut self, rates: ExchangeRates) {
        self.rates = rates;
    }

    /// Fetch a rate table through the provider chain without installing it.
    pub async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, CoreError> {
        self.rate_service
            .refresh(self.currency_service.base_currency())
            .await
    }

    /// Fetch a fresh rate table and install it.
    ///
    /// Returns `false` and keeps the current table when every provider fails.
    /// Calling it again is the retry.
    pub async fn refresh_exchange_rates(&mut self) -> bool {
        match self.fetch_exchange_rates().await {
            Ok(rates) => {
                self.set_exchange_rates(rates);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "exchange rate refresh failed, keeping current rates");
                false
            }
        }
    }

    #[must_use]
    pub fn rate_provider_names(&self) -> Vec<String> {
        self.rate_service.provider_names()
    }

    // ── Preferences ─────────────────────────────────────────────────

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Set the display currency. Must be exactly 3 ASCII letters.
    pub fn set_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let code = currency.trim().to_uppercase();
        if !is_currency_code(&code) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., INR, USD, EUR)"
            )));
        }
        self.preferences.currency = code;
        self.write_through()
    }

    /// Filter the default views to one account. `None`, blank or `"all"` clears it.
    pub fn set_active_account(&mut self, account_id: Option<&str>) -> Result<(), CoreError> {
        let filter = normalize_account_filter(account_id);
        if let Some(id) = filter.as_deref() {
            if self.ledger.account(id).is_none() {
                return Err(CoreError::AccountNotFound(id.to_string()));
            }
        }
        self.preferences.active_account = filter;
        self.write_through()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), CoreError> {
        self.preferences.theme = theme;
        self.write_through()
    }

    /// Flip between dark and light; returns the new theme.
    pub fn toggle_theme(&mut self) -> Result<Theme, CoreError> {
        let theme = self.preferences.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    // ── Sample Data ─────────────────────────────────────────────────

    /// Fill the ledger with demo transactions dated up to `today`.
    ///
    /// An empty ledger first gets two sample accounts and the first one
    /// becomes the active account. Transactions go to the first account.
    /// Returns how many transactions were added.
    pub fn seed_sample_data(&mut self, today: NaiveDate) -> Result<usize, CoreError> {
        if self.ledger.accounts.is_empty() {
            for data in sample_data::sample_accounts() {
                self.ledger_service.add_account(&mut self.ledger, data)?;
            }
            self.preferences.active_account = self.ledger.accounts.first().map(|a| a.id.clone());
        }
        let Some(account_id) = self.ledger.accounts.first().map(|a| a.id.clone()) else {
            return Ok(0);
        };

        let offset = self.config.utc_offset();
        let samples = sample_data::sample_transactions(&account_id, today, |naive| {
            local_timestamp(offset, naive)
        });
        let added = samples.len();
        for data in samples {
            self.ledger_service.add_transaction(&mut self.ledger, data)?;
        }
        tracing::info!(added, account = %account_id, "seeded sample data");

        self.write_through()?;
        Ok(added)
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Write the whole state to the store. Use after a failed write-through.
    pub fn save(&mut self) -> Result<(), CoreError> {
        self.storage
            .persist(self.store.as_mut(), &self.ledger, &self.preferences)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether the store is behind the in-memory state.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Give the store back, e.g. to reopen it.
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    // ── Internal ────────────────────────────────────────────────────

    fn scope<'a>(&'a self, account: Option<&'a str>) -> ViewScope<'a> {
        ViewScope::new(&self.ledger, &self.rates, &self.preferences.currency)
            .for_account(account)
            .with_utc_offset(self.config.utc_offset())
    }

    /// Current time in the configured offset, or the system's local time.
    fn now(&self) -> DateTime<FixedOffset> {
        match self.config.utc_offset() {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Persist after a mutation. On failure the mutation stays applied and
    /// the tracker is marked dirty.
    fn write_through(&mut self) -> Result<(), CoreError> {
        self.dirty = true;
        if let Err(e) = self.save() {
            tracing::error!(error = %e, "write-through failed, changes kept in memory");
            return Err(e);
        }
        Ok(())
    }
}

/// Wall-clock time to a timestamp in `offset`, or in the system timezone.
/// Times that fall in a daylight-saving gap resolve to `None`.
fn local_timestamp(offset: Option<FixedOffset>, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match offset {
        Some(offset) => offset.from_local_datetime(&naive).single(),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|d| d.fixed_offset()),
    }
}
