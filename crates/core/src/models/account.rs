use serde::{Deserialize, Serialize};

/// The user's cash account as reported by the ledger store.
///
/// Read-only to this crate: only the external ledger mutates the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Current balance in `currency`
    pub balance: f64,

    /// ISO currency code (e.g., "USD", "EUR")
    pub currency: String,
}

impl Account {
    pub fn new(balance: f64, currency: impl Into<String>) -> Self {
        Self {
            balance,
            currency: currency.into().to_uppercase(),
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: 0.0,
            currency: "USD".to_string(),
        }
    }
}
