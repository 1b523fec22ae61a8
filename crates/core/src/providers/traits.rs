use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::analysis::{AnalysisPayload, AnalysisRequest};
use crate::models::budget::Budget;
use crate::models::subscription::Subscription;
use crate::models::transaction::Transaction;

/// The external ledger this crate reads from.
///
/// Implementations only need simple filtered queries. Everything they return is
/// treated as read-only; failures are neutralised by the context aggregator.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LedgerStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// The user's cash account and its current balance.
    async fn get_account(&self, user_id: &str) -> Result<Account, CoreError>;

    /// Transactions dated within `from..=to`, in any order.
    async fn get_transactions(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, CoreError>;

    /// Subscriptions whose status is active.
    async fn get_active_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>, CoreError>;

    /// All budgets defined by the user.
    async fn get_budgets(&self, user_id: &str) -> Result<Vec<Budget>, CoreError>;
}

/// Consumer of the numeric context, typically an LLM-backed text generator.
///
/// Phrasing and prompt construction belong entirely to the implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait AdvisoryGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: &AnalysisRequest,
        payload: &AnalysisPayload,
    ) -> Result<String, CoreError>;
}
