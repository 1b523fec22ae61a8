use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::debug;

use crate::models::context::SpendingForecast;
use crate::models::data_point::DataPoint;
use crate::models::forecast::{Forecast, ForecastPoint, PointKind, MAX_FORECAST_MONTHS};
use crate::models::trend::TrendModel;

/// Extrapolates a date-indexed history into monthly forecast points.
pub struct ForecastService;

impl ForecastService {
    pub fn new() -> Self {
        Self
    }

    /// Fit a trend over `history` and project `months_ahead` monthly points.
    ///
    /// History is sorted here, so callers may pass it in any order.
    /// Point `i` sits on the first day of the month `i` months after the last
    /// observation and its value is rounded to a whole unit.
    /// `months_ahead` is capped at [`MAX_FORECAST_MONTHS`]; points that would
    /// fall past chrono's last representable date are not emitted.
    pub fn generate(&self, history: &[DataPoint], months_ahead: usize) -> Forecast {
        if history.is_empty() {
            return Forecast::default();
        }
        let months_ahead = months_ahead.min(MAX_FORECAST_MONTHS);

        let mut sorted = history.to_vec();
        sorted.sort_by_key(|p| p.date);

        let model = TrendModel::fit(&sorted);
        let Some(last) = sorted.last().map(|p| p.date) else {
            return Forecast::default();
        };
        let anchor = first_of_month(last);

        let forecast = (1..=months_ahead)
            .filter_map(|i| {
                let offset = u32::try_from(i).ok()?;
                let date = anchor.checked_add_months(Months::new(offset))?;
                Some(ForecastPoint {
                    label: month_label(date),
                    date,
                    value: model.predict(date).round(),
                    kind: PointKind::Projected,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            observations = model.observations(),
            slope = model.slope(),
            trend = %model.trend(),
            points = forecast.len(),
            "Generated forecast"
        );

        Forecast {
            model: Some(model),
            forecast,
        }
    }

    /// Turn a monthly spending series into the advisory-facing spending forecast.
    ///
    /// Without history the result is the stable, all-zero forecast.
    pub fn spending_forecast(&self, monthly_spend: &[DataPoint], months_ahead: usize) -> SpendingForecast {
        let Forecast { model, forecast } = self.generate(monthly_spend, months_ahead);
        let Some(model) = model else {
            return SpendingForecast::default();
        };

        let mut sorted = monthly_spend.to_vec();
        sorted.sort_by_key(|p| p.date);

        let average = sorted.iter().map(|p| p.value).sum::<f64>() / sorted.len() as f64;
        let next_month_estimate = forecast.first().map(|p| p.value).unwrap_or(0.0);

        let mut points: Vec<ForecastPoint> = sorted
            .iter()
            .map(|p| ForecastPoint {
                label: month_label(p.date),
                date: first_of_month(p.date),
                value: p.value.round(),
                kind: PointKind::Actual,
            })
            .collect();
        points.extend(forecast);

        SpendingForecast {
            trend: model.trend().into(),
            next_month_estimate,
            average_monthly_spend: super::round_cents(average),
            points,
        }
    }
}

impl Default for ForecastService {
    fn default() -> Self {
        Self::new()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}
