use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::budget::BudgetProgress;
use super::cash_flow::CashFlowPoint;
use super::forecast::ForecastPoint;
use super::safe_spend::SafeSpendMetrics;
use super::subscription::Subscription;
use super::transaction::Transaction;
use super::trend::TrendDirection;

/// Headline figures over the trailing history window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub balance: f64,

    pub currency: String,

    /// Sum of positive amounts in the window
    pub income: f64,

    /// Sum of |negative amounts| in the window
    pub expenses: f64,

    /// income − expenses
    pub net: f64,

    /// net / income × 100, 0 when there was no income
    pub savings_rate: f64,

    pub transaction_count: usize,

    /// Largest expense categories, biggest first
    pub top_categories: Vec<CategorySpend>,
}

impl Default for FinancialSummary {
    fn default() -> Self {
        Self {
            balance: 0.0,
            currency: "USD".to_string(),
            income: 0.0,
            expenses: 0.0,
            net: 0.0,
            savings_rate: 0.0,
            transaction_count: 0,
            top_categories: Vec::new(),
        }
    }
}

/// Expense total of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
}

/// Cadence of a detected recurring charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    /// Nominal interval in days.
    pub fn interval_days(&self) -> i64 {
        match self {
            RecurrenceFrequency::Weekly => 7,
            RecurrenceFrequency::Monthly => 30,
            RecurrenceFrequency::Yearly => 365,
        }
    }
}

/// A charge that repeats at a regular cadence in the ledger but may not be
/// registered as a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCharge {
    /// Normalized merchant description
    pub merchant: String,

    /// Median charge amount (positive)
    pub amount: f64,

    pub frequency: RecurrenceFrequency,

    pub occurrences: usize,

    pub first_seen: NaiveDate,

    pub last_seen: NaiveDate,

    /// last_seen plus the nominal interval
    pub next_expected: NaiveDate,
}

/// 0–100 composite score. Components add up to `overall`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub overall: u8,
    /// Savings-rate component, 0–40
    pub savings: u8,
    /// Share of budgets within limit, 0–30
    pub budget_adherence: u8,
    /// Balance relative to the emergency fund target, 0–30
    pub emergency_cushion: u8,
}

/// Direction of monthly spending, phrased for the advisory layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl From<TrendDirection> for SpendingTrend {
    fn from(direction: TrendDirection) -> Self {
        match direction {
            TrendDirection::Up => SpendingTrend::Increasing,
            TrendDirection::Down => SpendingTrend::Decreasing,
            TrendDirection::Flat => SpendingTrend::Stable,
        }
    }
}

impl std::fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpendingTrend::Increasing => write!(f, "increasing"),
            SpendingTrend::Decreasing => write!(f, "decreasing"),
            SpendingTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Monthly spending history plus its projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub trend: SpendingTrend,

    /// Projected spend for the first forecast month (0 without history)
    pub next_month_estimate: f64,

    /// Mean of the observed monthly totals
    pub average_monthly_spend: f64,

    /// Actual months followed by projected months
    pub points: Vec<ForecastPoint>,
}

/// Consolidated snapshot handed to the advisory layer.
///
/// Every field has an empty/zero form; a branch whose data could not be
/// fetched is listed in `degraded` and left at that form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialContext {
    pub user_id: String,
    pub as_of: Option<NaiveDate>,
    pub summary: FinancialSummary,
    pub recent_transactions: Vec<Transaction>,
    pub budgets: Vec<BudgetProgress>,
    pub subscriptions: Vec<Subscription>,
    pub detected_recurring: Vec<RecurringCharge>,
    pub cash_flow: Vec<CashFlowPoint>,
    pub safe_spend: SafeSpendMetrics,
    pub health_score: HealthScore,
    pub spending_forecast: SpendingForecast,
    /// Names of the store queries that failed and were defaulted
    pub degraded: Vec<String>,
}
