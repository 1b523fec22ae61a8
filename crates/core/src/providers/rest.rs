use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::budget::Budget;
use crate::models::subscription::Subscription;
use crate::models::transaction::Transaction;
use crate::storage::secret_cache::SecretCache;

use super::traits::LedgerStore;

const STORE_NAME: &str = "Rest";

/// Secret-cache key under which the store's API key is expected by default.
pub const DEFAULT_API_KEY_NAME: &str = "ledger_api_key";

/// PostgREST-style ledger store.
///
/// - **Tables**: `accounts`, `transactions`, `subscriptions`, `budgets`, each with a `user_id` column
/// - **Filters**: `column=op.value` query parameters (`eq`, `gte`, `lte`)
/// - **Auth**: the API key is sent as `apikey` and as a bearer token
///
/// The key is not held by the store; it is looked up in the shared
/// [`SecretCache`] on every request so an invalidated key stops being used
/// immediately.
pub struct RestLedgerStore {
    client: Client,
    base_url: String,
    secrets: Arc<SecretCache>,
    api_key_name: String,
}

impl RestLedgerStore {
    pub fn new(base_url: impl Into<String>, secrets: Arc<SecretCache>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secrets,
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
        }
    }

    /// Use a different secret-cache key for the API key.
    pub fn with_api_key_name(mut self, name: impl Into<String>) -> Self {
        self.api_key_name = name.into();
        self
    }

    /// Full URL of a table endpoint.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Query parameters selecting a user's transactions in `from..=to`.
    pub fn transaction_query(user_id: &str, from: NaiveDate, to: NaiveDate) -> Vec<(String, String)> {
        vec![
            ("select".into(), "id,amount,date,category,description".into()),
            ("user_id".into(), format!("eq.{user_id}")),
            ("date".into(), format!("gte.{}", from.format("%Y-%m-%d"))),
            ("date".into(), format!("lte.{}", to.format("%Y-%m-%d"))),
            ("order".into(), "date.asc".into()),
        ]
    }

    /// Query parameters selecting a user's active subscriptions.
    pub fn subscription_query(user_id: &str) -> Vec<(String, String)> {
        vec![
            ("select".into(), "id,name,amount,next_billing_date,status".into()),
            ("user_id".into(), format!("eq.{user_id}")),
            ("status".into(), "eq.active".into()),
        ]
    }

    /// Query parameters selecting a user's budgets.
    pub fn budget_query(user_id: &str) -> Vec<(String, String)> {
        vec![
            ("select".into(), "id,category,amount,period,start_date".into()),
            ("user_id".into(), format!("eq.{user_id}")),
        ]
    }

    /// Query parameters selecting a user's account.
    pub fn account_query(user_id: &str) -> Vec<(String, String)> {
        vec![
            ("select".into(), "balance,currency".into()),
            ("user_id".into(), format!("eq.{user_id}")),
            ("limit".into(), "1".into()),
        ]
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, CoreError> {
        let api_key = self
            .secrets
            .get(&self.api_key_name)
            .ok_or_else(|| CoreError::MissingCredential(self.api_key_name.clone()))?;

        let url = self.table_url(table);
        debug!(table, url = %url, "Querying ledger store");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &api_key)
            .bearer_auth(&api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Store {
                store: STORE_NAME.into(),
                message: format!("Query on '{table}' failed with HTTP {status}"),
            });
        }

        resp.json().await.map_err(|e| CoreError::Store {
            store: STORE_NAME.into(),
            message: format!("Failed to parse '{table}' rows: {e}"),
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerStore for RestLedgerStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn get_account(&self, user_id: &str) -> Result<Account, CoreError> {
        let rows: Vec<Account> = self
            .fetch_rows("accounts", &Self::account_query(user_id))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CoreError::AccountNotFound(user_id.to_string()))
    }

    async fn get_transactions(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.fetch_rows("transactions", &Self::transaction_query(user_id, from, to))
            .await
    }

    async fn get_active_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>, CoreError> {
        self.fetch_rows("subscriptions", &Self::subscription_query(user_id))
            .await
    }

    async fn get_budgets(&self, user_id: &str) -> Result<Vec<Budget>, CoreError> {
        self.fetch_rows("budgets", &Self::budget_query(user_id)).await
    }
}
