pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

use errors::CoreError;
use models::{
    analysis::{Advice, AnalysisPayload, AnalysisRequest},
    budget::{Budget, BudgetProgress},
    cash_flow::CashFlowPoint,
    context::FinancialContext,
    data_point::DataPoint,
    forecast::Forecast,
    safe_spend::SafeSpendMetrics,
    settings::InsightsSettings,
    subscription::Subscription,
    transaction::Transaction,
};
use providers::{
    rest::RestLedgerStore,
    traits::{AdvisoryGenerator, LedgerStore},
};
use services::{
    analysis_service::AnalysisService,
    budget_service::BudgetService,
    cash_flow_service::CashFlowService,
    context_service::ContextService,
    forecast_service::ForecastService,
    safe_spend_service::{SafeSpendInputs, SafeSpendService},
};
use storage::{encryption::SealedSecret, secret_cache::SecretCache};

/// Main entry point for the ledger-insights core library.
///
/// Owns the ledger store, the settings and the secret cache, and exposes the
/// analytics either as one consolidated snapshot (`build_context`) or as the
/// individual pure computations.
#[must_use]
pub struct LedgerInsights {
    store: Arc<dyn LedgerStore>,
    secrets: Arc<SecretCache>,
    context_service: ContextService,
    analysis_service: AnalysisService,
    forecast_service: ForecastService,
    cash_flow_service: CashFlowService,
    safe_spend_service: SafeSpendService,
    budget_service: BudgetService,
}

impl std::fmt::Debug for LedgerInsights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerInsights")
            .field("store", &self.store.name())
            .field("settings", self.context_service.settings())
            .field("secrets", &self.secrets)
            .finish()
    }
}

impl LedgerInsights {
    /// Create an engine over any ledger store. Settings are validated first.
    pub fn new(store: Arc<dyn LedgerStore>, settings: InsightsSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let secrets = Arc::new(SecretCache::from_settings(&settings));
        Ok(Self::build(store, secrets, settings))
    }

    /// Create an engine backed by a PostgREST-style store at `base_url`.
    /// The store's API key must be placed in [`LedgerInsights::secrets`]
    /// (directly or via [`LedgerInsights::unlock_secret`]) before querying.
    pub fn with_rest_store(base_url: &str, settings: InsightsSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        let secrets = Arc::new(SecretCache::from_settings(&settings));
        let store = Arc::new(RestLedgerStore::new(base_url, Arc::clone(&secrets)));
        Ok(Self::build(store, secrets, settings))
    }

    #[must_use]
    pub fn settings(&self) -> &InsightsSettings {
        self.context_service.settings()
    }

    /// The shared credential cache.
    #[must_use]
    pub fn secrets(&self) -> &Arc<SecretCache> {
        &self.secrets
    }

    // ── Secrets ─────────────────────────────────────────────────────

    /// Decrypt a sealed credential into the secret cache under `key`.
    pub fn unlock_secret(&self, key: &str, sealed: &SealedSecret, password: &str) -> Result<(), CoreError> {
        self.secrets.unseal_into(key, sealed, password)
    }

    /// Drop a cached credential. Returns `true` if it was cached.
    pub fn invalidate_secret(&self, key: &str) -> bool {
        self.secrets.invalidate(key)
    }

    // ── Consolidated snapshot ───────────────────────────────────────

    /// Snapshot for `user_id` as of today (UTC). Never fails.
    pub async fn build_context(&self, user_id: &str) -> FinancialContext {
        let today = chrono::Utc::now().date_naive();
        self.build_context_at(user_id, today).await
    }

    /// Snapshot for `user_id` as of `today`. Never fails.
    pub async fn build_context_at(&self, user_id: &str, today: NaiveDate) -> FinancialContext {
        self.context_service
            .build_context(self.store.as_ref(), user_id, today)
            .await
    }

    // ── Advisory ────────────────────────────────────────────────────

    /// Numeric payload answering `request` for `user_id` as of `today`.
    pub async fn prepare_analysis(
        &self,
        user_id: &str,
        request: &AnalysisRequest,
        today: NaiveDate,
    ) -> AnalysisPayload {
        let context = self.build_context_at(user_id, today).await;
        self.analysis_service.prepare(request, &context)
    }

    /// Build the payload for `request` and hand it to `generator`.
    ///
    /// A generator failure is logged and leaves `text` empty; the payload is
    /// still returned.
    pub async fn advise(
        &self,
        user_id: &str,
        request: AnalysisRequest,
        generator: &dyn AdvisoryGenerator,
        today: NaiveDate,
    ) -> Advice {
        let payload = self.prepare_analysis(user_id, &request, today).await;
        let text = match generator.generate(&request, &payload).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(generator = generator.name(), error = %e, "Advisory generation failed");
                None
            }
        };
        Advice {
            request,
            payload,
            text,
        }
    }

    // ── Individual computations ─────────────────────────────────────

    /// Fit a trend over `history` and project `months_ahead` monthly points.
    #[must_use]
    pub fn forecast(&self, history: &[DataPoint], months_ahead: usize) -> Forecast {
        self.forecast_service.generate(history, months_ahead)
    }

    /// 30 reconstructed days followed by 30 projected days around `today`.
    #[must_use]
    pub fn project_cash_flow(
        &self,
        current_balance: f64,
        transactions: &[Transaction],
        subscriptions: &[Subscription],
        today: NaiveDate,
    ) -> Vec<CashFlowPoint> {
        self.cash_flow_service
            .project(current_balance, transactions, subscriptions, today)
    }

    /// Daily allowance until payday.
    #[must_use]
    pub fn safe_spend(&self, inputs: &SafeSpendInputs) -> SafeSpendMetrics {
        self.safe_spend_service.compute(inputs)
    }

    /// Consumption of `budget` in the window containing `today`.
    /// `ledger` may be unfiltered; it is narrowed to the budget's category and expenses.
    #[must_use]
    pub fn budget_progress(&self, budget: &Budget, ledger: &[Transaction], today: NaiveDate) -> BudgetProgress {
        let relevant = BudgetService::expense_transactions_for(budget, ledger);
        self.budget_service.progress(budget, &relevant, today)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(store: Arc<dyn LedgerStore>, secrets: Arc<SecretCache>, settings: InsightsSettings) -> Self {
        let safe_spend_service = SafeSpendService::new(settings.emergency_fund_months);
        Self {
            store,
            secrets,
            context_service: ContextService::new(settings),
            analysis_service: AnalysisService::new(),
            forecast_service: ForecastService::new(),
            cash_flow_service: CashFlowService::new(),
            safe_spend_service,
            budget_service: BudgetService::new(),
        }
    }
}
