//! Domain types used throughout the engines.
//!
//! This module defines:
//!
//! - identifiers and the immutable `PriceObservation` record
//! - catalog entities (`Product`, `Store`, `Category`)
//! - engine outputs (`ForecastResult`, `InflationSeries`, `AlignedSeries`, ...)
//! - validated request configuration (`DashboardConfig`, `ForecastConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
