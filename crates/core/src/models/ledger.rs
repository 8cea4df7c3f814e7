use serde::{Deserialize, Serialize};

use super::account::Account;
use super::transaction::Transaction;

/// The single source of truth: all accounts and all transactions,
/// amounts in the base currency.
///
/// Transactions are kept in insertion order; views sort on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// All transactions booked against one account.
    pub fn transactions_for<'a>(&'a self, account_id: &'a str) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| t.account_id == account_id)
    }
}
