//! Ordinary-least-squares trend line over a date-indexed series.
//!
//! The x axis is "days since the earliest observation", so the fitted slope
//! reads as change in value per day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_point::DataPoint;

/// Slope (per day) beyond which a series is classified as trending.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.5;

/// Direction of a fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            TrendDirection::Up
        } else if slope < -TREND_SLOPE_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

/// A fitted line `value = slope · days_since(origin) + intercept`.
///
/// Fitting never fails: fewer than two usable points give the degenerate
/// model (slope 0, intercept 0, flat, every prediction 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    slope: f64,
    intercept: f64,
    /// Earliest date of the fitted series; `None` for the degenerate model
    origin: Option<NaiveDate>,
    observations: usize,
    r_squared: f64,
    trend: TrendDirection,
}

impl TrendModel {
    /// The flat, all-zero model used when there is nothing to fit.
    pub fn degenerate() -> Self {
        Self {
            slope: 0.0,
            intercept: 0.0,
            origin: None,
            observations: 0,
            r_squared: 0.0,
            trend: TrendDirection::Flat,
        }
    }

    /// Fit a line over `data`. Input order does not matter; non-finite values are ignored.
    pub fn fit(data: &[DataPoint]) -> Self {
        let points: Vec<&DataPoint> = data.iter().filter(|p| p.value.is_finite()).collect();
        if points.len() < 2 {
            return Self::degenerate();
        }

        let origin = match points.iter().map(|p| p.date).min() {
            Some(d) => d,
            None => return Self::degenerate(),
        };

        let n = points.len() as f64;
        let xs: Vec<f64> = points
            .iter()
            .map(|p| (p.date - origin).num_days() as f64)
            .collect();

        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = points.iter().map(|p| p.value).sum();
        let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
        let sum_xy: f64 = xs.iter().zip(&points).map(|(x, p)| x * p.value).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        // All observations on one date: no x spread, keep the mean as a flat line.
        let (slope, intercept) = if denominator.abs() < f64::EPSILON {
            (0.0, sum_y / n)
        } else {
            let slope = (n * sum_xy - sum_x * sum_y) / denominator;
            (slope, (sum_y - slope * sum_x) / n)
        };

        let mean_y = sum_y / n;
        let ss_tot: f64 = points.iter().map(|p| (p.value - mean_y).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(&points)
            .map(|(x, p)| (p.value - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            slope,
            intercept,
            origin: Some(origin),
            observations: points.len(),
            r_squared,
            trend: TrendDirection::from_slope(slope),
        }
    }

    /// Predicted value at `target`, never below zero.
    pub fn predict(&self, target: NaiveDate) -> f64 {
        let Some(origin) = self.origin else {
            return 0.0;
        };
        let x = (target - origin).num_days() as f64;
        (self.slope * x + self.intercept).max(0.0)
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn trend(&self) -> TrendDirection {
        self.trend
    }

    pub fn origin(&self) -> Option<NaiveDate> {
        self.origin
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Coefficient of determination of the fit (0 for degenerate or constant series).
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn is_degenerate(&self) -> bool {
        self.origin.is_none()
    }
}

impl Default for TrendModel {
    fn default() -> Self {
        Self::degenerate()
    }
}
