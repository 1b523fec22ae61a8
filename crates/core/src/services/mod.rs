pub mod analysis_service;
pub mod budget_service;
pub mod cash_flow_service;
pub mod context_service;
pub mod forecast_service;
pub mod safe_spend_service;
pub mod summary_service;

use chrono::{Duration, NaiveDate};

/// Round a monetary value to cents. Only applied when building output structs.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `date` minus `days`, saturating at the earliest representable date.
pub(crate) fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .unwrap_or(NaiveDate::MIN)
}
