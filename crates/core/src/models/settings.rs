use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::forecast::MAX_FORECAST_MONTHS;

/// Prefix for environment variables that override settings.
pub const ENV_PREFIX: &str = "LEDGER_INSIGHTS_";

/// Longest accepted trailing window, in days (ten years).
pub const MAX_HISTORY_DAYS: i64 = 3650;

/// Longest accepted secret lifetime, in seconds (30 days).
pub const MAX_SECRET_TTL_SECS: i64 = 30 * 86_400;

/// Tunables for the analytics services and the context aggregator.
///
/// Every field has a default, so a partial JSON document is valid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsSettings {
    /// Currency reported when the account record is unavailable
    pub default_currency: String,

    /// Payday cadence: payday is assumed this many days after today.
    pub payday_interval_days: i64,

    /// Trailing window (days) for burn rate, summary and average daily spend
    pub history_days: i64,

    /// Months of monthly spending history fed to the spending forecast
    pub spending_history_months: u32,

    /// Months projected by the spending forecast
    pub forecast_months: usize,

    /// Emergency fund target expressed in months of expenses
    pub emergency_fund_months: f64,

    /// How many of the newest transactions the context carries
    pub recent_transactions_limit: usize,

    /// How many expense categories the summary lists
    pub top_categories_limit: usize,

    /// Lifetime of decrypted secrets in the secret cache
    pub secret_ttl_secs: i64,
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            payday_interval_days: 14,
            history_days: 30,
            spending_history_months: 6,
            forecast_months: 3,
            emergency_fund_months: 3.0,
            recent_transactions_limit: 10,
            top_categories_limit: 5,
            secret_ttl_secs: 900,
        }
    }
}

impl InsightsSettings {
    /// Parse settings from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `LEDGER_INSIGHTS_*` environment overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        self.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from an arbitrary lookup (key without prefix → value).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DEFAULT_CURRENCY") {
            self.default_currency = v.trim().to_uppercase();
        }
        if let Some(v) = lookup("PAYDAY_INTERVAL_DAYS") {
            self.payday_interval_days = parse_override("PAYDAY_INTERVAL_DAYS", &v)?;
        }
        if let Some(v) = lookup("HISTORY_DAYS") {
            self.history_days = parse_override("HISTORY_DAYS", &v)?;
        }
        if let Some(v) = lookup("SPENDING_HISTORY_MONTHS") {
            self.spending_history_months = parse_override("SPENDING_HISTORY_MONTHS", &v)?;
        }
        if let Some(v) = lookup("FORECAST_MONTHS") {
            self.forecast_months = parse_override("FORECAST_MONTHS", &v)?;
        }
        if let Some(v) = lookup("EMERGENCY_FUND_MONTHS") {
            self.emergency_fund_months = parse_override("EMERGENCY_FUND_MONTHS", &v)?;
        }
        if let Some(v) = lookup("RECENT_TRANSACTIONS_LIMIT") {
            self.recent_transactions_limit = parse_override("RECENT_TRANSACTIONS_LIMIT", &v)?;
        }
        if let Some(v) = lookup("TOP_CATEGORIES_LIMIT") {
            self.top_categories_limit = parse_override("TOP_CATEGORIES_LIMIT", &v)?;
        }
        if let Some(v) = lookup("SECRET_TTL_SECS") {
            self.secret_ttl_secs = parse_override("SECRET_TTL_SECS", &v)?;
        }
        self.validate()
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Config(format!(
                "Invalid currency code '{}': must be exactly 3 ASCII letters",
                self.default_currency
            )));
        }
        if self.payday_interval_days < 0 {
            return Err(CoreError::Config(
                "payday_interval_days must not be negative".into(),
            ));
        }
        if !(1..=MAX_HISTORY_DAYS).contains(&self.history_days) {
            return Err(CoreError::Config(format!(
                "history_days must be between 1 and {MAX_HISTORY_DAYS}"
            )));
        }
        if self.forecast_months > MAX_FORECAST_MONTHS {
            return Err(CoreError::Config(format!(
                "forecast_months must not exceed {MAX_FORECAST_MONTHS}"
            )));
        }
        if !self.emergency_fund_months.is_finite() || self.emergency_fund_months < 0.0 {
            return Err(CoreError::Config(
                "emergency_fund_months must be a non-negative number".into(),
            ));
        }
        if !(1..=MAX_SECRET_TTL_SECS).contains(&self.secret_ttl_secs) {
            return Err(CoreError::Config(format!(
                "secret_ttl_secs must be between 1 and {MAX_SECRET_TTL_SECS}"
            )));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value.trim().parse().map_err(|_| {
        CoreError::Config(format!("Invalid value '{value}' for {ENV_PREFIX}{key}"))
    })
}
