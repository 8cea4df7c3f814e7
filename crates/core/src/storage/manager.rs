use serde::de::DeserializeOwned;

use crate::config::TrackerConfig;
use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::preferences::{normalize_account_filter, Preferences, Theme};

use super::records::{StoredAccount, StoredTransaction};
use super::store::KeyValueStore;

const ACCOUNTS_KEY: &str = "accounts";
const TRANSACTIONS_KEY: &str = "transactions";
const ACTIVE_ACCOUNT_KEY: &str = "active_account";
const CURRENCY_KEY: &str = "currency";
const THEME_KEY: &str = "theme";

/// Loads and saves the ledger and preferences through a [`KeyValueStore`].
///
/// Collections are stored as JSON arrays; preferences as plain strings.
pub struct StorageManager {
    accounts_key: String,
    transactions_key: String,
    active_account_key: String,
    currency_key: String,
    theme_key: String,
    default_currency: String,
}

impl StorageManager {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            accounts_key: config.storage_key(ACCOUNTS_KEY),
            transactions_key: config.storage_key(TRANSACTIONS_KEY),
            active_account_key: config.storage_key(ACTIVE_ACCOUNT_KEY),
            currency_key: config.storage_key(CURRENCY_KEY),
            theme_key: config.storage_key(THEME_KEY),
            default_currency: config.base_currency.clone(),
        }
    }

    /// Every key this manager reads or writes.
    pub fn keys(&self) -> [&str; 5] {
        [
            self.accounts_key.as_str(),
            self.transactions_key.as_str(),
            self.active_account_key.as_str(),
            self.currency_key.as_str(),
            self.theme_key.as_str(),
        ]
    }

    /// Read the persisted state. Never fails.
    ///
    /// Corrupted collections reset to empty, unreadable records are skipped,
    /// and preferences fall back to their defaults one by one.
    pub fn hydrate(&self, store: &dyn KeyValueStore) -> (Ledger, Preferences) {
        let stored_accounts: Vec<StoredAccount> = self.read_collection(store, &self.accounts_key);
        let stored_transactions: Vec<StoredTransaction> =
            self.read_collection(store, &self.transactions_key);

        let mut ledger = Ledger::new();

        for record in stored_transactions {
            match record.into_transaction() {
                Ok(tx) => {
                    if ledger.transaction(&tx.id).is_some() {
                        tracing::warn!(id = %tx.id, "duplicate transaction id in store, skipped");
                        continue;
                    }
                    ledger.transactions.push(tx);
                }
                Err(reason) => tracing::warn!(%reason, "skipping unreadable transaction record"),
            }
        }

        for record in stored_accounts {
            let Some((mut account, derive_opening)) = record.into_account() else {
                tracing::warn!("skipping account record without name or id");
                continue;
            };
            if ledger.account(&account.id).is_some() {
                tracing::warn!(id = %account.id, "duplicate account id in store, skipped");
                continue;
            }
            if derive_opening {
                let booked: f64 = ledger
                    .transactions_for(&account.id)
                    .map(|t| t.signed_amount())
                    .sum();
                account.opening_balance = account.balance - booked;
            }
            ledger.accounts.push(account);
        }

        let orphans = ledger
            .transactions
            .iter()
            .filter(|t| ledger.account(&t.account_id).is_none())
            .count();
        if orphans > 0 {
            tracing::warn!(count = orphans, "transactions reference unknown accounts");
        }

        let preferences = self.read_preferences(store, &ledger);

        tracing::debug!(
            accounts = ledger.accounts.len(),
            transactions = ledger.transactions.len(),
            currency = %preferences.currency,
            "ledger hydrated"
        );

        (ledger, preferences)
    }

    /// Write the whole state. Stops at the first failing key.
    pub fn persist(
        &self,
        store: &mut dyn KeyValueStore,
        ledger: &Ledger,
        preferences: &Preferences,
    ) -> Result<(), CoreError> {
        let accounts = serde_json::to_string(&ledger.accounts)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize accounts: {e}")))?;
        let transactions = serde_json::to_string(&ledger.transactions).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize transactions: {e}"))
        })?;

        store.set(&self.accounts_key, &accounts)?;
        store.set(&self.transactions_key, &transactions)?;
        store.set(&self.currency_key, &preferences.currency)?;
        store.set(&self.theme_key, preferences.theme.as_str())?;
        match &preferences.active_account {
            Some(id) => store.set(&self.active_account_key, id)?,
            None => store.remove(&self.active_account_key)?,
        }
        Ok(())
    }

    fn read_raw(&self, store: &dyn KeyValueStore, key: &str) -> Option<String> {
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "store read failed, treating as absent");
                None
            }
        }
    }

    fn read_collection<T: DeserializeOwned>(&self, store: &dyn KeyValueStore, key: &str) -> Vec<T> {
        let Some(raw) = self.read_raw(store, key) else {
            return Vec::new();
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }

        // Parse the array first so one bad element doesn't discard the rest.
        let items: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(key, error = %e, "stored collection is corrupted, resetting to empty");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect()
    }

    fn read_preferences(&self, store: &dyn KeyValueStore, ledger: &Ledger) -> Preferences {
        let mut preferences = Preferences {
            currency: self.default_currency.clone(),
            ..Preferences::default()
        };

        if let Some(raw) = self.read_raw(store, &self.currency_key) {
            let code = unquote(&raw).to_uppercase();
            if is_currency_code(&code) {
                preferences.currency = code;
            } else {
                tracing::warn!(value = %raw, "invalid stored currency, using default");
            }
        }

        if let Some(raw) = self.read_raw(store, &self.theme_key) {
            match Theme::parse(unquote(&raw)) {
                Some(theme) => preferences.theme = theme,
                None => tracing::warn!(value = %raw, "invalid stored theme, using dark"),
            }
        }

        if let Some(raw) = self.read_raw(store, &self.active_account_key) {
            preferences.active_account = normalize_account_filter(Some(unquote(&raw)))
                .filter(|id| {
                    let exists = ledger.account(id).is_some();
                    if !exists {
                        tracing::debug!(id = %id, "stored active account no longer exists");
                    }
                    exists
                });
        }

        preferences
    }
}

/// Three ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Strings saved with `JSON.stringify` carry their quotes; plain ones don't.
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
}
