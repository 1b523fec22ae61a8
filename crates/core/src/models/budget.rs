use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetPeriod::Weekly => write!(f, "weekly"),
            BudgetPeriod::Monthly => write!(f, "monthly"),
            BudgetPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// Inclusive date range over which a budget's consumption is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A spending limit for one category.
///
/// `spent` is never stored; it is derived from transactions by the budget service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Category reference the limit applies to
    pub category: String,

    /// The limit, in the account currency
    pub amount: f64,

    pub period: BudgetPeriod,

    /// Anchors the window: day-of-month for monthly, weekday for weekly,
    /// first day for yearly budgets.
    pub start_date: NaiveDate,
}

impl Budget {
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            amount,
            period,
            start_date,
        }
    }

    /// The budget window that contains `today`.
    ///
    /// - monthly: from the latest occurrence of `start_date`'s day-of-month
    ///   (clamped to short months) up to the day before the next occurrence
    /// - weekly: from the latest occurrence of `start_date`'s weekday, 7 days
    /// - yearly: `start_date` plus one year, minus one day
    pub fn window(&self, today: NaiveDate) -> PeriodWindow {
        match self.period {
            BudgetPeriod::Monthly => {
                let anchor_day = self.start_date.day();
                let this_month = month_start(today);
                let mut start = anchored_in_month(this_month, anchor_day);
                if start > today {
                    let previous_month = month_start(this_month - Duration::days(1));
                    start = anchored_in_month(previous_month, anchor_day);
                }
                let next_start = month_start(start)
                    .checked_add_months(Months::new(1))
                    .map(|first| anchored_in_month(first, anchor_day))
                    .unwrap_or(start + Duration::days(31));
                PeriodWindow {
                    start,
                    end: next_start - Duration::days(1),
                }
            }
            BudgetPeriod::Weekly => {
                let today_idx = today.weekday().num_days_from_monday() as i64;
                let anchor_idx = self.start_date.weekday().num_days_from_monday() as i64;
                let back = (today_idx - anchor_idx).rem_euclid(7);
                let start = today - Duration::days(back);
                PeriodWindow {
                    start,
                    end: start + Duration::days(6),
                }
            }
            BudgetPeriod::Yearly => {
                let start = self.start_date;
                let end = start
                    .checked_add_months(Months::new(12))
                    .unwrap_or(start + Duration::days(365))
                    - Duration::days(1);
                PeriodWindow { start, end }
            }
        }
    }
}

/// Derived consumption of a budget for its current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub budget_id: Uuid,

    pub category: String,

    pub period: BudgetPeriod,

    /// The configured limit
    pub limit: f64,

    /// Σ|amount| of in-window transactions
    pub spent: f64,

    /// limit − spent; negative when over budget
    pub remaining: f64,

    /// Display percentage, clamped to 0..=100
    pub percentage: f64,

    /// Unclamped truth: spent > limit. May disagree with `percentage` capping at 100.
    pub is_over_budget: bool,

    pub window: PeriodWindow,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(28)
}

fn anchored_in_month(first: NaiveDate, anchor_day: u32) -> NaiveDate {
    let day = anchor_day.clamp(1, days_in_month(first));
    first + Duration::days(day as i64 - 1)
}
