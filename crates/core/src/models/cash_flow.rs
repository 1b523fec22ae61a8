use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of the balance chart: reconstructed history or projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,

    /// End-of-day balance, rounded to cents
    pub value: f64,

    /// `false` for reconstructed history, `true` for projected days
    pub is_forecast: bool,
}
