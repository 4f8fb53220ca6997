//! Window-level analytics over a filtered observation set.
//!
//! - basket-proxy daily index (`inflation`)
//! - per-store series on a contiguous date axis (`align`)
//! - cheapest-store basket ranking (`basket`)
//!
//! All three are pure functions of the same slice; the dashboard runs them
//! side by side.

pub mod align;
pub mod basket;
pub mod inflation;

pub use align::*;
pub use basket::*;
pub use inflation::*;
