//! Input/output helpers.
//!
//! - CSV load + import with upsert (`ingest`)
//! - CSV export and dataset persistence (`export`)
//! - JSON bundles for the presentation layer (`bundle`)

pub mod bundle;
pub mod export;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use ingest::*;
