use chrono::NaiveDate;
use tracing::debug;

use crate::models::safe_spend::{RiskLevel, SafeSpendMetrics};
use crate::models::transaction::Transaction;

use super::{days_before, round_cents};

/// Below `HIGH_RISK_MULTIPLIER × average daily spend` the allowance is high risk.
pub const HIGH_RISK_MULTIPLIER: f64 = 0.5;

/// Below `MEDIUM_RISK_MULTIPLIER × average daily spend` the allowance is medium risk.
pub const MEDIUM_RISK_MULTIPLIER: f64 = 1.0;

/// Days per month used to scale daily figures.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Operands of a safe-to-spend computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeSpendInputs {
    pub current_balance: f64,
    /// Sum of active recurring bills due before payday
    pub active_subscription_total: f64,
    /// Supplied by the caller; 0 or less means payday is today
    pub days_until_payday: i64,
    pub trailing_average_daily_spend: f64,
    /// Reported back in the metrics only
    pub monthly_income: f64,
}

impl SafeSpendInputs {
    pub fn new(
        current_balance: f64,
        active_subscription_total: f64,
        days_until_payday: i64,
        trailing_average_daily_spend: f64,
    ) -> Self {
        Self {
            current_balance,
            active_subscription_total,
            days_until_payday,
            trailing_average_daily_spend,
            monthly_income: 0.0,
        }
    }

    pub fn with_monthly_income(mut self, monthly_income: f64) -> Self {
        self.monthly_income = monthly_income;
        self
    }
}

/// Derives the daily discretionary ceiling until the next payday.
pub struct SafeSpendService {
    emergency_fund_months: f64,
}

impl SafeSpendService {
    pub fn new(emergency_fund_months: f64) -> Self {
        Self {
            emergency_fund_months,
        }
    }

    /// Compute the allowance. Never fails: a negative post-bills balance
    /// floors the limit at 0, and a payday of today (or earlier) returns the
    /// whole available balance instead of dividing.
    pub fn compute(&self, inputs: &SafeSpendInputs) -> SafeSpendMetrics {
        let available_after_bills = inputs.current_balance - inputs.active_subscription_total;

        let raw_limit = if inputs.days_until_payday > 0 {
            available_after_bills / inputs.days_until_payday as f64
        } else {
            available_after_bills
        };
        let safe_daily_limit = raw_limit.max(0.0);

        let avg_spend = inputs.trailing_average_daily_spend;
        let risk_level = if safe_daily_limit < HIGH_RISK_MULTIPLIER * avg_spend {
            RiskLevel::High
        } else if safe_daily_limit < MEDIUM_RISK_MULTIPLIER * avg_spend {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let monthly_expenses = avg_spend * DAYS_PER_MONTH;
        let emergency_fund_estimate = self.emergency_fund_target(avg_spend);

        debug!(
            available_after_bills,
            days_until_payday = inputs.days_until_payday,
            safe_daily_limit,
            risk = %risk_level,
            "Computed safe-to-spend"
        );

        SafeSpendMetrics {
            safe_daily_limit: round_cents(safe_daily_limit),
            monthly_income: round_cents(inputs.monthly_income),
            monthly_expenses: round_cents(monthly_expenses),
            emergency_fund_estimate: round_cents(emergency_fund_estimate),
            days_until_payday: inputs.days_until_payday,
            risk_level,
        }
    }

    /// Unrounded emergency fund target: monthly expenses times the configured months.
    pub fn emergency_fund_target(&self, trailing_average_daily_spend: f64) -> f64 {
        trailing_average_daily_spend * DAYS_PER_MONTH * self.emergency_fund_months
    }

    /// Average daily expense over the `window_days` days ending `today`.
    pub fn trailing_average_daily_spend(
        transactions: &[Transaction],
        today: NaiveDate,
        window_days: i64,
    ) -> f64 {
        if window_days < 1 {
            return 0.0;
        }
        let start = days_before(today, window_days - 1);
        let spent: f64 = transactions
            .iter()
            .filter(|t| t.is_expense() && t.date >= start && t.date <= today)
            .map(|t| t.amount.abs())
            .sum();
        spent / window_days as f64
    }
}

impl Default for SafeSpendService {
    fn default() -> Self {
        Self::new(3.0)
    }
}
