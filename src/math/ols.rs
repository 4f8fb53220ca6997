//! Least squares solver and fit statistics.
//!
//! The forecast engine solves a tiny regression problem per product:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We use SVD so tall design matrices (many more rows than columns) solve
//!   robustly. (Nalgebra's `QR::solve` is intended for square systems.)
//! - A rank-deficient system (e.g. every point on the same day) is rejected
//!   rather than answered with a minimum-norm solution; callers decide the
//!   fallback.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    if svd.rank(1e-9) < x.ncols() {
        return None;
    }

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Residual sum of squares treated as an exact fit.
const PERFECT_FIT_SSE: f64 = 1e-9;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Coefficient of determination of `fitted` against `observed`.
///
/// With constant observations (`SS_tot == 0`) the score is `1.0` for a perfect
/// fit (up to solver noise) and `0.0` otherwise.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    let Some(y_mean) = mean(observed) else {
        return 0.0;
    };

    let ss_res: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f) * (y - f))
        .sum();
    let ss_tot: f64 = observed.iter().map(|y| (y - y_mean) * (y - y_mean)).sum();

    if ss_tot == 0.0 {
        return if ss_res <= PERFECT_FIT_SSE { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Round to two decimals (half away from zero). Negative zero becomes `0.0`.
pub fn round2(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    if r == 0.0 { 0.0 } else { r }
}
