use chrono::Local;

use crate::errors::CoreError;
use crate::models::account::{
    Account, BalanceMismatch, NewAccount, DEFAULT_ACCOUNT_COLOR, DEFAULT_ACCOUNT_KIND,
};
use crate::models::ledger::Ledger;
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, DEFAULT_INCOME_SOURCE};

/// Allowed drift between a stored balance and the recomputed one.
const BALANCE_TOLERANCE: f64 = 1e-6;

/// Manages accounts and transactions and keeps balances consistent.
///
/// Pure business logic, no I/O. Every operation validates fully before it
/// touches the ledger, so a rejected call leaves it exactly as it was.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Create an account. Names must be unique; the id is the name.
    pub fn add_account(&self, ledger: &mut Ledger, data: NewAccount) -> Result<Account, CoreError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::Validation("Account name must not be empty".into()));
        }
        if ledger.accounts.iter().any(|a| a.name == name || a.id == name) {
            return Err(CoreError::DuplicateAccount(name));
        }

        let opening_balance = data.opening_balance.unwrap_or(0.0);
        if !opening_balance.is_finite() {
            return Err(CoreError::Validation(format!(
                "Opening balance for '{name}' must be a finite number"
            )));
        }

        let kind = match data.kind.trim() {
            "" => DEFAULT_ACCOUNT_KIND.to_string(),
            k => k.to_string(),
        };

        let account = Account {
            id: name.clone(),
            name,
            kind,
            color: data.color.or_else(|| Some(DEFAULT_ACCOUNT_COLOR.to_string())),
            opening_balance,
            balance: opening_balance,
        };
        ledger.accounts.push(account.clone());
        tracing::debug!(account_id = %account.id, "account added");
        Ok(account)
    }

    /// Remove an account that no transaction references.
    pub fn delete_account(&self, ledger: &mut Ledger, account_id: &str) -> Result<Account, CoreError> {
        let idx = ledger
            .accounts
            .iter()
            .position(|a| a.id == account_id)
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;

        let referencing = ledger.transactions_for(account_id).count();
        if referencing > 0 {
            return Err(CoreError::Validation(format!(
                "Account '{account_id}' still has {referencing} transaction(s); delete them first"
            )));
        }

        let removed = ledger.accounts.remove(idx);
        tracing::debug!(account_id = %removed.id, "account deleted");
        Ok(removed)
    }

    /// Record a transaction and apply it to its account's balance.
    ///
    /// Blank expense categories are already `Uncategorized` by construction;
    /// blank income sources become "Unknown Source", blank titles "Income"/"Expense".
    pub fn add_transaction(
        &self,
        ledger: &mut Ledger,
        data: NewTransaction,
    ) -> Result<Transaction, CoreError> {
        if !data.amount.is_finite() || data.amount <= 0.0 {
            return Err(CoreError::Validation(
                "Transaction amount must be positive".into(),
            ));
        }

        let kind = match data.kind {
            TransactionKind::Income { source } if source.trim().is_empty() => {
                TransactionKind::income(DEFAULT_INCOME_SOURCE)
            }
            TransactionKind::Income { source } => TransactionKind::income(source.trim()),
            expense @ TransactionKind::Expense { .. } => expense,
        };

        let title = match data.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => kind.default_title().to_string(),
        };

        let date = data.date.unwrap_or_else(|| Local::now().fixed_offset());
        let transaction = Transaction::new(kind, data.account_id, data.amount, title, date);

        // Lookup last: nothing below can fail, so append + balance land together.
        let account = ledger
            .account_mut(&transaction.account_id)
            .ok_or_else(|| CoreError::AccountNotFound(transaction.account_id.clone()))?;
        account.balance += transaction.signed_amount();
        ledger.transactions.push(transaction.clone());

        tracing::debug!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            kind = %transaction.kind,
            "transaction added"
        );
        Ok(transaction)
    }

    /// Remove a transaction and reverse its balance effect.
    ///
    /// Unknown ids are a no-op (`None`). If the account is gone, only the
    /// transaction is removed.
    pub fn delete_transaction(&self, ledger: &mut Ledger, transaction_id: &str) -> Option<Transaction> {
        let idx = ledger
            .transactions
            .iter()
            .position(|t| t.id == transaction_id)?;
        let removed = ledger.transactions.remove(idx);

        match ledger.account_mut(&removed.account_id) {
            Some(account) => account.balance -= removed.signed_amount(),
            None => tracing::warn!(
                transaction_id = %removed.id,
                account_id = %removed.account_id,
                "deleted transaction references a missing account; balance untouched"
            ),
        }

        tracing::debug!(transaction_id = %removed.id, "transaction deleted");
        Some(removed)
    }

    /// Display name for an account id, or the id itself if unknown.
    pub fn account_name(&self, ledger: &Ledger, account_id: &str) -> String {
        ledger
            .account(account_id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| account_id.to_string())
    }

    /// Balance an account should have given its opening balance and transactions.
    pub fn expected_balance(&self, ledger: &Ledger, account: &Account) -> f64 {
        account.opening_balance
            + ledger
                .transactions_for(&account.id)
                .map(Transaction::signed_amount)
                .sum::<f64>()
    }

    /// Accounts whose stored balance drifted from the recomputed one.
    pub fn verify_balances(&self, ledger: &Ledger) -> Vec<BalanceMismatch> {
        ledger
            .accounts
            .iter()
            .filter_map(|account| {
                let expected = self.expected_balance(ledger, account);
                if (expected - account.balance).abs() > BALANCE_TOLERANCE {
                    Some(BalanceMismatch {
                        account_id: account.id.clone(),
                        stored: account.balance,
                        expected,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Rewrite drifted balances to their recomputed value.
    /// Returns the mismatches that were fixed.
    pub fn reconcile_balances(&self, ledger: &mut Ledger) -> Vec<BalanceMismatch> {
        let mismatches = self.verify_balances(ledger);
        for mismatch in &mismatches {
            if let Some(account) = ledger.account_mut(&mismatch.account_id) {
                tracing::info!(
                    account_id = %mismatch.account_id,
                    stored = mismatch.stored,
                    expected = mismatch.expected,
                    "reconciling account balance"
                );
                account.balance = mismatch.expected;
            }
        }
        mismatches
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
