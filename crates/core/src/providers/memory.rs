use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::budget::Budget;
use crate::models::subscription::Subscription;
use crate::models::transaction::Transaction;

use super::traits::LedgerStore;

/// Everything the store knows about one user.
#[derive(Debug, Clone, Default)]
pub struct UserLedger {
    pub account: Option<Account>,
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<Subscription>,
    pub budgets: Vec<Budget>,
}

/// `HashMap`-backed ledger store for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    users: HashMap<String, UserLedger>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&mut self, user_id: &str, account: Account) {
        self.ledger_mut(user_id).account = Some(account);
    }

    pub fn add_transaction(&mut self, user_id: &str, transaction: Transaction) {
        self.ledger_mut(user_id).transactions.push(transaction);
    }

    pub fn add_transactions(&mut self, user_id: &str, transactions: impl IntoIterator<Item = Transaction>) {
        self.ledger_mut(user_id).transactions.extend(transactions);
    }

    pub fn add_subscription(&mut self, user_id: &str, subscription: Subscription) {
        self.ledger_mut(user_id).subscriptions.push(subscription);
    }

    pub fn add_budget(&mut self, user_id: &str, budget: Budget) {
        self.ledger_mut(user_id).budgets.push(budget);
    }

    fn ledger_mut(&mut self, user_id: &str) -> &mut UserLedger {
        self.users.entry(user_id.to_string()).or_default()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerStore for InMemoryLedgerStore {
    fn name(&self) -> &str {
        "InMemory"
    }

    async fn get_account(&self, user_id: &str) -> Result<Account, CoreError> {
        self.users
            .get(user_id)
            .and_then(|l| l.account.clone())
            .ok_or_else(|| CoreError::AccountNotFound(user_id.to_string()))
    }

    async fn get_transactions(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, CoreError> {
        Ok(self
            .users
            .get(user_id)
            .map(|l| {
                l.transactions
                    .iter()
                    .filter(|t| t.date >= from && t.date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_active_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>, CoreError> {
        Ok(self
            .users
            .get(user_id)
            .map(|l| l.subscriptions.iter().filter(|s| s.is_active()).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_budgets(&self, user_id: &str) -> Result<Vec<Budget>, CoreError> {
        Ok(self
            .users
            .get(user_id)
            .map(|l| l.budgets.clone())
            .unwrap_or_default())
    }
}
