use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::budget::BudgetProgress;
use super::cash_flow::CashFlowPoint;
use super::context::{CategorySpend, FinancialSummary, SpendingForecast};
use super::safe_spend::SafeSpendMetrics;

/// The closed set of questions the advisory layer can ask about a ledger.
///
/// Each kind carries exactly the inputs it needs; payloads are produced by
/// an exhaustive match in the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisRequest {
    /// Where is the money going, and where is spending heading?
    SpendingReview { focus_category: Option<String> },

    /// How far through a category's budget is the user?
    BudgetCheck { category: String },

    /// Will the balance stay above a floor over the next 30 days?
    CashFlowOutlook { low_balance_threshold: f64 },

    /// Can the user afford a purchase today?
    SafeToSpend { planned_purchase: Option<f64> },
}

/// Numeric context for one `AnalysisRequest`, mirroring its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisPayload {
    SpendingReview {
        summary: FinancialSummary,
        forecast: SpendingForecast,
        /// Spend of the requested category, when one was given and found
        focus: Option<CategorySpend>,
    },

    BudgetCheck {
        category: String,
        /// `None` when no budget exists for the category
        progress: Option<BudgetProgress>,
    },

    CashFlowOutlook {
        projection: Vec<CashFlowPoint>,
        lowest_balance: f64,
        lowest_balance_date: Option<NaiveDate>,
        days_below_threshold: usize,
    },

    SafeToSpend {
        metrics: SafeSpendMetrics,
        /// Whether the planned purchase fits in today's allowance
        purchase_fits: Option<bool>,
    },
}

/// Result of an advisory round-trip.
///
/// `text` is `None` when the generator failed; the payload is always present
/// so the caller can still show numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub request: AnalysisRequest,
    pub payload: AnalysisPayload,
    pub text: Option<String>,
}
