//! Small fan-in helpers used by the context aggregator: headline summary,
//! recurring-charge detection, monthly spending series and the health score.

use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

use crate::models::account::Account;
use crate::models::budget::BudgetProgress;
use crate::models::context::{
    CategorySpend, FinancialSummary, HealthScore, RecurrenceFrequency, RecurringCharge,
};
use crate::models::data_point::DataPoint;
use crate::models::transaction::Transaction;

use super::{days_before, round_cents};

/// Minimum occurrences before a repeating charge counts as recurring.
pub const MIN_RECURRING_OCCURRENCES: usize = 3;

/// Allowed relative deviation of each charge from the median amount.
pub const AMOUNT_TOLERANCE: f64 = 0.05;

/// Share of intervals that must match the detected cadence.
pub const INTERVAL_CONSISTENCY: f64 = 0.7;

/// Savings rate (percent) that earns the full savings component.
pub const TARGET_SAVINGS_RATE: f64 = 20.0;

const SAVINGS_POINTS: f64 = 40.0;
const BUDGET_POINTS: f64 = 30.0;
const CUSHION_POINTS: f64 = 30.0;

const UNCATEGORIZED: &str = "uncategorized";

/// Raw cash movement over a trailing window. Expenses are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CashTotals {
    pub income: f64,
    pub expenses: f64,
}

impl CashTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }

    /// Net as a percentage of income; 0 without income.
    pub fn savings_rate(&self) -> f64 {
        if self.income > 0.0 {
            self.net() / self.income * 100.0
        } else {
            0.0
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Unrounded income and expenses over the `window_days` days ending `today`.
    pub fn window_totals(
        &self,
        transactions: &[Transaction],
        today: NaiveDate,
        window_days: i64,
    ) -> CashTotals {
        let start = days_before(today, window_days.max(1) - 1);
        let mut totals = CashTotals::default();
        for tx in transactions.iter().filter(|t| t.date >= start && t.date <= today) {
            if tx.is_income() {
                totals.income += tx.amount;
            } else if tx.is_expense() {
                totals.expenses += tx.amount.abs();
            }
        }
        totals
    }

    /// Income, expenses and top categories over the `window_days` days ending `today`.
    pub fn summarize(
        &self,
        account: &Account,
        transactions: &[Transaction],
        today: NaiveDate,
        window_days: i64,
        top_categories: usize,
    ) -> FinancialSummary {
        let start = days_before(today, window_days.max(1) - 1);
        let in_window: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= today)
            .collect();
        let totals = self.window_totals(transactions, today, window_days);

        let mut by_category: HashMap<String, f64> = HashMap::new();
        for tx in in_window.iter().filter(|t| t.is_expense()) {
            let category = tx
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            *by_category.entry(category).or_insert(0.0) += tx.amount.abs();
        }
        let mut categories: Vec<CategorySpend> = by_category
            .into_iter()
            .map(|(category, total)| CategorySpend {
                category,
                total: round_cents(total),
            })
            .collect();
        // Largest first; ties broken by name for a stable order
        categories.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        categories.truncate(top_categories);

        FinancialSummary {
            balance: round_cents(account.balance),
            currency: account.currency.clone(),
            income: round_cents(totals.income),
            expenses: round_cents(totals.expenses),
            net: round_cents(totals.net()),
            savings_rate: round_cents(totals.savings_rate()),
            transaction_count: in_window.len(),
            top_categories: categories,
        }
    }

    /// Total expenses per calendar month for the `months` complete months before
    /// `today`'s month, starting at the first month that has any activity.
    ///
    /// Each point is dated on the first of its month. Empty when the ledger has
    /// no transactions in range.
    pub fn monthly_expense_series(
        &self,
        transactions: &[Transaction],
        today: NaiveDate,
        months: u32,
    ) -> Vec<DataPoint> {
        let current_month = first_of_month(today);
        let Some(range_start) = current_month.checked_sub_months(Months::new(months)) else {
            return Vec::new();
        };

        let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
        let mut first_active: Option<NaiveDate> = None;
        for tx in transactions {
            if tx.date < range_start || tx.date >= current_month {
                continue;
            }
            let month = first_of_month(tx.date);
            first_active = Some(first_active.map_or(month, |m| m.min(month)));
            if tx.is_expense() {
                *totals.entry(month).or_insert(0.0) += tx.amount.abs();
            }
        }

        let Some(mut month) = first_active else {
            return Vec::new();
        };
        let mut series = Vec::new();
        while month < current_month {
            series.push(DataPoint::new(month, totals.get(&month).copied().unwrap_or(0.0)));
            month = match month.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        series
    }

    /// Find charges that repeat at a weekly, monthly or yearly cadence.
    ///
    /// Expenses are grouped by normalized description. A group qualifies when it
    /// has at least three charges, every amount is within 5% of the median, and
    /// at least 70% of the gaps match the cadence implied by the mean gap.
    pub fn detect_recurring(&self, transactions: &[Transaction]) -> Vec<RecurringCharge> {
        let mut by_merchant: HashMap<String, Vec<&Transaction>> = HashMap::new();
        for tx in transactions.iter().filter(|t| t.is_expense()) {
            let Some(description) = tx.description.as_deref() else {
                continue;
            };
            let merchant = normalize_merchant(description);
            if merchant.is_empty() {
                continue;
            }
            by_merchant.entry(merchant).or_default().push(tx);
        }

        let mut charges: Vec<RecurringCharge> = by_merchant
            .into_iter()
            .filter_map(|(merchant, txs)| recurring_pattern(merchant, txs))
            .collect();
        charges.sort_by(|a, b| a.merchant.cmp(&b.merchant));

        debug!(found = charges.len(), "Detected recurring charges");
        charges
    }

    /// Composite 0–100 score from savings rate, budget adherence and the
    /// balance measured against the emergency fund target.
    ///
    /// Takes the unrounded window totals and balance. With no budgets the
    /// adherence component is neutral (half marks).
    pub fn health_score(
        &self,
        totals: &CashTotals,
        balance: f64,
        budgets: &[BudgetProgress],
        emergency_fund_target: f64,
    ) -> HealthScore {
        let savings =
            (totals.savings_rate() / TARGET_SAVINGS_RATE).clamp(0.0, 1.0) * SAVINGS_POINTS;

        let budget_adherence = if budgets.is_empty() {
            BUDGET_POINTS / 2.0
        } else {
            let within = budgets.iter().filter(|b| !b.is_over_budget).count();
            within as f64 / budgets.len() as f64 * BUDGET_POINTS
        };

        let emergency_cushion = if emergency_fund_target > 0.0 {
            (balance / emergency_fund_target).clamp(0.0, 1.0) * CUSHION_POINTS
        } else if balance > 0.0 {
            CUSHION_POINTS
        } else {
            0.0
        };

        let savings = savings.round() as u8;
        let budget_adherence = budget_adherence.round() as u8;
        let emergency_cushion = emergency_cushion.round() as u8;

        HealthScore {
            overall: savings + budget_adherence + emergency_cushion,
            savings,
            budget_adherence,
            emergency_cushion,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, drop digits and punctuation, collapse whitespace.
/// "NETFLIX.COM 866-579" and "Netflix.com" both become "netflix com".
pub fn normalize_merchant(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn recurring_pattern(merchant: String, mut txs: Vec<&Transaction>) -> Option<RecurringCharge> {
    if txs.len() < MIN_RECURRING_OCCURRENCES {
        return None;
    }
    txs.sort_by_key(|t| t.date);

    let amounts: Vec<f64> = txs.iter().map(|t| t.amount.abs()).collect();
    let median_amount = median(&amounts);
    if median_amount < 0.01 {
        return None;
    }
    if !amounts
        .iter()
        .all(|a| (a - median_amount).abs() / median_amount <= AMOUNT_TOLERANCE)
    {
        return None;
    }

    let intervals: Vec<i64> = txs
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect();
    let avg_interval = intervals.iter().sum::<i64>() as f64 / intervals.len() as f64;

    let (frequency, tolerance) = if avg_interval < 10.0 {
        (RecurrenceFrequency::Weekly, 3)
    } else if avg_interval < 45.0 {
        (RecurrenceFrequency::Monthly, 7)
    } else if avg_interval < 400.0 {
        (RecurrenceFrequency::Yearly, 30)
    } else {
        return None;
    };

    let expected = frequency.interval_days();
    let consistent = intervals
        .iter()
        .filter(|&&gap| (gap - expected).abs() <= tolerance)
        .count();
    if (consistent as f64 / intervals.len() as f64) < INTERVAL_CONSISTENCY {
        return None;
    }

    let first_seen = txs.first()?.date;
    let last_seen = txs.last()?.date;
    Some(RecurringCharge {
        merchant,
        amount: round_cents(median_amount),
        frequency,
        occurrences: txs.len(),
        first_seen,
        last_seen,
        next_expected: last_seen + Duration::days(expected),
    })
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}
