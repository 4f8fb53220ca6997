//! Per-product linear-trend forecast.
//!
//! Given one product's dated prices inside the lookback window we:
//! - build the design matrix `[1, day_offset]` (offset relative to `today`)
//! - solve OLS with the SVD solver
//! - score the fit with R²
//! - project the line to `today + horizon`
//!
//! Points are not deduplicated per day: a store that reports more often than
//! the others pulls the line towards its own prices.

use chrono::{Days, NaiveDate};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{ForecastConfig, ForecastResult, ForecastStatus, ProductId};
use crate::math::{mean, r_squared, round2, solve_least_squares};
use crate::models::{fill_design_row, LinearTrend, TREND_PARAMS};
use crate::repo::{ObservationFilter, ObservationRepository};

/// Below this many observations the regression is considered unstable.
pub const MIN_FORECAST_POINTS: usize = 5;

/// Forecast one product from the repository.
pub fn forecast_product<R: ObservationRepository + ?Sized>(
    repo: &R,
    product_id: ProductId,
    config: &ForecastConfig,
    today: NaiveDate,
) -> ForecastResult {
    let filter = ObservationFilter::in_window(config.window(today)).with_product(Some(product_id));
    let points: Vec<(NaiveDate, f64)> = repo
        .observations(&filter)
        .into_iter()
        .map(|o| (o.date, o.price))
        .collect();

    debug!(product = %product_id, points = points.len(), "forecasting product");
    fit_trend(&points, today, config.horizon_days)
}

/// Fit a trend line to `(date, price)` points and project it `horizon_days` ahead.
///
/// The result is rounded to two decimals and depends only on the input
/// multiset of points, `today`, and the horizon.
pub fn fit_trend(points: &[(NaiveDate, f64)], today: NaiveDate, horizon_days: u32) -> ForecastResult {
    let n = points.len();
    if n < MIN_FORECAST_POINTS || horizon_days == 0 {
        return ForecastResult::insufficient(n);
    }

    let trend = fit_line(points, today);

    let fitted: Vec<f64> = points.iter().map(|&(d, _)| trend.predict(d)).collect();
    let observed: Vec<f64> = points.iter().map(|&(_, p)| p).collect();
    let r2 = r_squared(&observed, &fitted);

    let future = today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    let predicted_today = trend.predict(today);
    let predicted_future = trend.predict(future);
    let daily_trend = (predicted_future - predicted_today) / f64::from(horizon_days);

    ForecastResult {
        status: ForecastStatus::Success,
        r2_score: Some(round2(r2)),
        predicted_price: Some(round2(predicted_future)),
        daily_trend: Some(round2(daily_trend)),
        points_used: n,
    }
}

/// OLS line through the points, with `today` as the day-offset origin.
///
/// Falls back to a flat line at the mean price when the system is
/// rank-deficient (all points on one day).
fn fit_line(points: &[(NaiveDate, f64)], today: NaiveDate) -> LinearTrend {
    let n = points.len();
    let mut x = DMatrix::<f64>::zeros(n, TREND_PARAMS);
    let mut row = [0.0; TREND_PARAMS];
    for (i, &(date, _)) in points.iter().enumerate() {
        fill_design_row(date, today, &mut row);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
    }
    let y = DVector::from_iterator(n, points.iter().map(|&(_, p)| p));

    match solve_least_squares(&x, &y) {
        Some(beta) => LinearTrend {
            origin: today,
            intercept: beta[0],
            slope: beta[1],
        },
        None => {
            let prices: Vec<f64> = points.iter().map(|&(_, p)| p).collect();
            LinearTrend::flat(today, mean(&prices).unwrap_or(0.0))
        }
    }
}
