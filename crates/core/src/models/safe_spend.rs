use serde::{Deserialize, Serialize};

/// How tight the safe-to-spend allowance is relative to usual spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Daily discretionary allowance until the next payday.
///
/// Recomputed on every request; nothing here is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeSpendMetrics {
    pub safe_daily_limit: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub emergency_fund_estimate: f64,
    pub days_until_payday: i64,
    pub risk_level: RiskLevel,
}

impl Default for SafeSpendMetrics {
    fn default() -> Self {
        Self {
            safe_daily_limit: 0.0,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            emergency_fund_estimate: 0.0,
            days_until_payday: 0,
            risk_level: RiskLevel::Low,
        }
    }
}
