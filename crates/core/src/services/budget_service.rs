use chrono::NaiveDate;
use tracing::debug;

use crate::models::budget::{Budget, BudgetProgress};
use crate::models::transaction::Transaction;

use super::round_cents;

/// Measures budget consumption inside the budget's current period window.
pub struct BudgetService;

impl BudgetService {
    pub fn new() -> Self {
        Self
    }

    /// Progress of `budget` for the window containing `today`.
    ///
    /// `transactions` are expected to be pre-filtered to the budget's category
    /// and to expenses (see [`BudgetService::expense_transactions_for`]); this
    /// method only applies the window.
    ///
    /// `percentage` is a display value clamped to 0..=100 (0 for a zero limit),
    /// while `is_over_budget` compares the unclamped amounts.
    pub fn progress(
        &self,
        budget: &Budget,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> BudgetProgress {
        let window = budget.window(today);

        let spent: f64 = transactions
            .iter()
            .filter(|t| window.contains(t.date))
            .map(|t| t.amount.abs())
            .sum();

        let remaining = budget.amount - spent;
        let percentage = if budget.amount == 0.0 {
            0.0
        } else {
            (spent / budget.amount * 100.0).clamp(0.0, 100.0)
        };
        let is_over_budget = spent > budget.amount;

        debug!(
            category = %budget.category,
            period = %budget.period,
            window_days = window.len_days(),
            spent,
            limit = budget.amount,
            "Computed budget progress"
        );

        BudgetProgress {
            budget_id: budget.id,
            category: budget.category.clone(),
            period: budget.period,
            limit: round_cents(budget.amount),
            spent: round_cents(spent),
            remaining: round_cents(remaining),
            percentage: round_cents(percentage),
            is_over_budget,
            window,
        }
    }

    /// The expenses of a raw ledger that count against `budget`.
    pub fn expense_transactions_for(budget: &Budget, ledger: &[Transaction]) -> Vec<Transaction> {
        ledger
            .iter()
            .filter(|t| t.is_expense() && t.in_category(&budget.category))
            .cloned()
            .collect()
    }

    /// Progress for every budget against an unfiltered ledger.
    pub fn progress_all(
        &self,
        budgets: &[Budget],
        ledger: &[Transaction],
        today: NaiveDate,
    ) -> Vec<BudgetProgress> {
        budgets
            .iter()
            .map(|budget| {
                let relevant = Self::expense_transactions_for(budget, ledger);
                self.progress(budget, &relevant, today)
            })
            .collect()
    }
}

impl Default for BudgetService {
    fn default() -> Self {
        Self::new()
    }
}
