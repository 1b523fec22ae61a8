use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single ledger entry.
///
/// **Sign convention**: negative amounts are expenses, positive amounts are income.
/// Transactions are append-only from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier (generated when the store does not provide one)
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Signed amount in the account currency
    pub amount: f64,

    /// Booking date (daily granularity)
    pub date: NaiveDate,

    /// Category reference (e.g., "groceries"), if categorized
    #[serde(default)]
    pub category: Option<String>,

    /// Merchant / payee text, used for recurring-charge detection
    #[serde(default)]
    pub description: Option<String>,
}

impl Transaction {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            category: None,
            description: None,
        }
    }

    /// Attach a category reference.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a merchant / payee description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Case-insensitive category match. Uncategorized transactions never match.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.trim().eq_ignore_ascii_case(category.trim()))
    }
}
