use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trend::TrendModel;

/// Most monthly points a single forecast produces (one century).
pub const MAX_FORECAST_MONTHS: usize = 1200;

/// Whether a chart point was observed or extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Actual,
    Projected,
}

/// One monthly point of a forecast chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Abbreviated month name (e.g., "Jan")
    pub label: String,

    /// First day of the month the point stands for
    pub date: NaiveDate,

    /// Value rounded to the nearest whole unit
    pub value: f64,

    pub kind: PointKind,
}

/// Output of the forecast generator.
///
/// `model` is `None` only when the history was empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub model: Option<TrendModel>,
    pub forecast: Vec<ForecastPoint>,
}
