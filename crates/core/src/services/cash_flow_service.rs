use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

use crate::models::cash_flow::CashFlowPoint;
use crate::models::subscription::Subscription;
use crate::models::transaction::Transaction;

use super::round_cents;

/// Days of reconstructed history in a projection.
pub const HISTORY_DAYS: i64 = 30;

/// Days projected forward.
pub const PROJECTION_DAYS: i64 = 30;

/// Builds the 60-day balance chart: 30 reconstructed days and 30 projected days.
///
/// The history is walked *backward* from the balance the ledger reports today,
/// so the chart always ends at the real current balance even when the
/// transaction log and the stored balance disagree.
///
/// Pure function of its inputs; fetching them is the caller's job.
pub struct CashFlowService;

impl CashFlowService {
    pub fn new() -> Self {
        Self
    }

    /// Project the balance around `today`.
    ///
    /// History (days `today-30 ..= today-1`, ascending, `is_forecast = false`):
    /// `balance(d) = balance(d+1) - net(d+1)` with `balance(today) = current_balance`.
    ///
    /// Projection (days `today+1 ..= today+30`, ascending, `is_forecast = true`):
    /// each day subtracts the average daily burn of the trailing window, plus
    /// every active subscription whose billing day-of-month matches the day.
    /// Billing on the 29th–31st is not remapped in shorter months.
    pub fn project(
        &self,
        current_balance: f64,
        transactions: &[Transaction],
        subscriptions: &[Subscription],
        today: NaiveDate,
    ) -> Vec<CashFlowPoint> {
        // The 30 days ending today: exactly the days whose net change the
        // backward walk consumes.
        let window_start = today - Duration::days(HISTORY_DAYS - 1);

        let mut net_by_date: HashMap<NaiveDate, f64> = HashMap::new();
        let mut total_expenses = 0.0;
        for tx in transactions {
            if tx.date < window_start || tx.date > today {
                continue;
            }
            *net_by_date.entry(tx.date).or_insert(0.0) += tx.amount;
            if tx.is_expense() {
                total_expenses += tx.amount;
            }
        }
        let avg_daily_burn = total_expenses.abs() / HISTORY_DAYS as f64;

        let mut points = Vec::with_capacity((HISTORY_DAYS + PROJECTION_DAYS) as usize);

        // ── Backward reconstruction ──
        let mut running = current_balance;
        let mut history = Vec::with_capacity(HISTORY_DAYS as usize);
        for offset in 1..=HISTORY_DAYS {
            let following_day = today - Duration::days(offset - 1);
            running -= net_by_date.get(&following_day).copied().unwrap_or(0.0);
            history.push(CashFlowPoint {
                date: today - Duration::days(offset),
                value: round_cents(running),
                is_forecast: false,
            });
        }
        history.reverse();
        points.extend(history);

        // ── Forward projection ──
        let active: Vec<&Subscription> = subscriptions.iter().filter(|s| s.is_active()).collect();
        let mut running = current_balance;
        for offset in 1..=PROJECTION_DAYS {
            let date = today + Duration::days(offset);
            running -= avg_daily_burn;
            for sub in active.iter().filter(|s| s.billing_day() == date.day()) {
                running -= sub.amount.abs();
            }
            points.push(CashFlowPoint {
                date,
                value: round_cents(running),
                is_forecast: true,
            });
        }

        debug!(
            current_balance,
            avg_daily_burn,
            subscriptions = active.len(),
            "Projected cash flow"
        );

        points
    }

    /// Lowest point of a projection, if any.
    pub fn lowest_point(points: &[CashFlowPoint]) -> Option<CashFlowPoint> {
        points
            .iter()
            .copied()
            .min_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Default for CashFlowService {
    fn default() -> Self {
        Self::new()
    }
}
