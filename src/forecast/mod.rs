//! Forecast engine: least-squares trend per product.

pub mod engine;

pub use engine::*;
