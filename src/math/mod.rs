//! Mathematical utilities: least squares and fit statistics.

pub mod ols;

pub use ols::*;
