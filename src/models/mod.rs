//! Trend model used by the forecast engine.
//!
//! Kept as small, pure functions so the fitting code only deals with design
//! rows and predictions.

pub mod trend;

pub use trend::*;
