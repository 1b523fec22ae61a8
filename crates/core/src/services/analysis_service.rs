use tracing::debug;

use crate::models::analysis::{AnalysisPayload, AnalysisRequest};
use crate::models::context::FinancialContext;
use crate::services::cash_flow_service::CashFlowService;

use super::round_cents;

/// Selects the numeric slice of a context that answers one analysis request.
pub struct AnalysisService;

impl AnalysisService {
    pub fn new() -> Self {
        Self
    }

    pub fn prepare(&self, request: &AnalysisRequest, context: &FinancialContext) -> AnalysisPayload {
        let payload = match request {
            AnalysisRequest::SpendingReview { focus_category } => {
                let focus = focus_category.as_deref().and_then(|wanted| {
                    context
                        .summary
                        .top_categories
                        .iter()
                        .find(|c| c.category.eq_ignore_ascii_case(wanted.trim()))
                        .cloned()
                });
                AnalysisPayload::SpendingReview {
                    summary: context.summary.clone(),
                    forecast: context.spending_forecast.clone(),
                    focus,
                }
            }

            AnalysisRequest::BudgetCheck { category } => AnalysisPayload::BudgetCheck {
                category: category.clone(),
                progress: context
                    .budgets
                    .iter()
                    .find(|b| b.category.eq_ignore_ascii_case(category.trim()))
                    .cloned(),
            },

            AnalysisRequest::CashFlowOutlook {
                low_balance_threshold,
            } => {
                let projected: Vec<_> = context
                    .cash_flow
                    .iter()
                    .filter(|p| p.is_forecast)
                    .copied()
                    .collect();
                let lowest = CashFlowService::lowest_point(&projected);
                AnalysisPayload::CashFlowOutlook {
                    days_below_threshold: projected
                        .iter()
                        .filter(|p| p.value < *low_balance_threshold)
                        .count(),
                    lowest_balance: lowest.map(|p| p.value).unwrap_or(context.summary.balance),
                    lowest_balance_date: lowest.map(|p| p.date),
                    projection: projected,
                }
            }

            AnalysisRequest::SafeToSpend { planned_purchase } => AnalysisPayload::SafeToSpend {
                metrics: context.safe_spend.clone(),
                purchase_fits: planned_purchase
                    .map(|amount| round_cents(amount.abs()) <= context.safe_spend.safe_daily_limit),
            },
        };

        debug!(user_id = %context.user_id, ?request, "Prepared analysis payload");
        payload
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new()
    }
}
