//! Linear price trend over calendar days.
//!
//! The regressor is the whole-day ordinal of a date (days from CE) measured
//! relative to an origin date. Shifting the ordinal keeps the design matrix
//! well conditioned and leaves the fitted line unchanged.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of columns in a design row: intercept + day offset.
pub const TREND_PARAMS: usize = 2;

/// `price(date) = intercept + slope * (ordinal(date) - ordinal(origin))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub origin: NaiveDate,
    pub intercept: f64,
    /// Price change per calendar day.
    pub slope: f64,
}

impl LinearTrend {
    /// A flat line at `level`.
    pub fn flat(origin: NaiveDate, level: f64) -> Self {
        Self {
            origin,
            intercept: level,
            slope: 0.0,
        }
    }

    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.intercept + self.slope * day_offset(date, self.origin)
    }
}

/// Signed whole days from `origin` to `date`, via the CE day ordinal.
pub fn day_offset(date: NaiveDate, origin: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - origin.num_days_from_ce())
}

/// Fill a design row for `date`. The constant term comes first.
///
/// # Panics
/// Panics if `out` is shorter than `TREND_PARAMS`.
pub fn fill_design_row(date: NaiveDate, origin: NaiveDate, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = day_offset(date, origin);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_moves_by_slope_per_day() {
        let origin = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let trend = LinearTrend {
            origin,
            intercept: 10.0,
            slope: 0.5,
        };
        let next_month = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        assert!((trend.predict(next_month) - 11.0).abs() < 1e-12);
        let before = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
        assert!((trend.predict(before) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn design_row_is_intercept_then_offset() {
        let origin = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let mut row = [0.0; TREND_PARAMS];
        fill_design_row(date, origin, &mut row);
        assert_eq!(row, [1.0, 3.0]);
    }
}
