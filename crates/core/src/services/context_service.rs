use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::account::Account;
use crate::models::context::FinancialContext;
use crate::models::settings::InsightsSettings;
use crate::models::subscription::{active_total, Subscription};
use crate::models::transaction::Transaction;
use crate::providers::traits::LedgerStore;
use crate::services::budget_service::BudgetService;
use crate::services::cash_flow_service::CashFlowService;
use crate::services::forecast_service::ForecastService;
use crate::services::safe_spend_service::{SafeSpendInputs, SafeSpendService, DAYS_PER_MONTH};
use crate::services::summary_service::SummaryService;

use super::days_before;

/// A monthly window can start up to 30 days before today (anchor on the 31st,
/// today on the 30th); weekly windows start at most 6 days back.
const BUDGET_WINDOW_LOOKBACK_DAYS: i64 = 31;

/// Assembles the consolidated snapshot consumed by the advisory layer.
///
/// The four store queries run concurrently and are all awaited before any
/// computation starts. A failed query never fails the snapshot: it is logged,
/// named in `degraded`, and replaced by its empty/zero form.
pub struct ContextService {
    settings: InsightsSettings,
    cash_flow_service: CashFlowService,
    safe_spend_service: SafeSpendService,
    budget_service: BudgetService,
    forecast_service: ForecastService,
    summary_service: SummaryService,
}

impl ContextService {
    pub fn new(settings: InsightsSettings) -> Self {
        let safe_spend_service = SafeSpendService::new(settings.emergency_fund_months);
        Self {
            settings,
            cash_flow_service: CashFlowService::new(),
            safe_spend_service,
            budget_service: BudgetService::new(),
            forecast_service: ForecastService::new(),
            summary_service: SummaryService::new(),
        }
    }

    pub fn settings(&self) -> &InsightsSettings {
        &self.settings
    }

    /// First date of the transaction history the snapshot needs: the earliest
    /// of the trailing window, the monthly spending history and the oldest
    /// possible start of a weekly or monthly budget window.
    pub fn history_start(&self, today: NaiveDate) -> NaiveDate {
        let trailing = days_before(today, self.settings.history_days.max(1) - 1);
        let month_start = days_before(today, today.day0() as i64);
        let monthly = month_start
            .checked_sub_months(Months::new(self.settings.spending_history_months))
            .unwrap_or(month_start);
        let budget_windows = days_before(today, BUDGET_WINDOW_LOOKBACK_DAYS);
        trailing.min(monthly).min(budget_windows)
    }

    /// Build the snapshot for `user_id` as of `today`. Never fails.
    pub async fn build_context(
        &self,
        store: &dyn LedgerStore,
        user_id: &str,
        today: NaiveDate,
    ) -> FinancialContext {
        let from = self.history_start(today);

        let (account, transactions, subscriptions, budgets) = futures::join!(
            store.get_account(user_id),
            store.get_transactions(user_id, from, today),
            store.get_active_subscriptions(user_id),
            store.get_budgets(user_id),
        );

        let mut degraded = Vec::new();
        let account = settle(account, "account", store.name(), &mut degraded)
            .unwrap_or_else(|| Account::new(0.0, self.settings.default_currency.clone()));
        let transactions: Vec<Transaction> =
            settle(transactions, "transactions", store.name(), &mut degraded).unwrap_or_default();
        let subscriptions: Vec<Subscription> =
            settle(subscriptions, "subscriptions", store.name(), &mut degraded)
                .unwrap_or_default()
                .into_iter()
                .filter(|s| s.is_active())
                .collect();
        let budgets = settle(budgets, "budgets", store.name(), &mut degraded).unwrap_or_default();

        let settings = &self.settings;

        let summary = self.summary_service.summarize(
            &account,
            &transactions,
            today,
            settings.history_days,
            settings.top_categories_limit,
        );

        let avg_daily_spend = SafeSpendService::trailing_average_daily_spend(
            &transactions,
            today,
            settings.history_days,
        );
        let totals = self
            .summary_service
            .window_totals(&transactions, today, settings.history_days);
        let monthly_income = totals.income * DAYS_PER_MONTH / settings.history_days.max(1) as f64;
        let safe_spend = self.safe_spend_service.compute(
            &SafeSpendInputs::new(
                account.balance,
                active_total(&subscriptions),
                settings.payday_interval_days,
                avg_daily_spend,
            )
            .with_monthly_income(monthly_income),
        );

        let cash_flow = self
            .cash_flow_service
            .project(account.balance, &transactions, &subscriptions, today);

        let budget_progress = self.budget_service.progress_all(&budgets, &transactions, today);

        let detected_recurring = self.summary_service.detect_recurring(&transactions);

        let monthly_spend = self.summary_service.monthly_expense_series(
            &transactions,
            today,
            settings.spending_history_months,
        );
        let spending_forecast = self
            .forecast_service
            .spending_forecast(&monthly_spend, settings.forecast_months);

        let health_score = self.summary_service.health_score(
            &totals,
            account.balance,
            &budget_progress,
            self.safe_spend_service.emergency_fund_target(avg_daily_spend),
        );

        let mut recent_transactions = transactions;
        recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
        recent_transactions.truncate(settings.recent_transactions_limit);

        info!(
            user_id,
            store = store.name(),
            degraded = degraded.len(),
            health = health_score.overall,
            "Built financial context"
        );
        debug!(
            budgets = budget_progress.len(),
            subscriptions = subscriptions.len(),
            recurring = detected_recurring.len(),
            "Context details"
        );

        FinancialContext {
            user_id: user_id.to_string(),
            as_of: Some(today),
            summary,
            recent_transactions,
            budgets: budget_progress,
            subscriptions,
            detected_recurring,
            cash_flow,
            safe_spend,
            health_score,
            spending_forecast,
            degraded,
        }
    }
}

impl Default for ContextService {
    fn default() -> Self {
        Self::new(InsightsSettings::default())
    }
}

/// Turn a branch result into a value, recording the branch as degraded on failure.
fn settle<T>(
    result: Result<T, CoreError>,
    branch: &str,
    store: &str,
    degraded: &mut Vec<String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(branch, store, error = %e, "Ledger query failed, using default");
            degraded.push(branch.to_string());
            None
        }
    }
}
