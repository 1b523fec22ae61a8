use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a recurring bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A known recurring bill.
///
/// Only `amount` and the day-of-month of `next_billing_date` influence
/// the cash-flow projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Display name (e.g., "Netflix")
    #[serde(default)]
    pub name: String,

    /// Amount charged per billing cycle (positive)
    pub amount: f64,

    pub next_billing_date: NaiveDate,

    pub status: SubscriptionStatus,
}

impl Subscription {
    pub fn new(name: impl Into<String>, amount: f64, next_billing_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            next_billing_date,
            status: SubscriptionStatus::Active,
        }
    }

    pub fn cancelled(mut self) -> Self {
        self.status = SubscriptionStatus::Cancelled;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Day of month the bill recurs on.
    pub fn billing_day(&self) -> u32 {
        self.next_billing_date.day()
    }
}

/// Sum of the amounts of all active subscriptions.
pub fn active_total(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.is_active())
        .map(|s| s.amount.abs())
        .sum()
}
