//! Reporting utilities: plain-text rendering of engine outputs for the terminal.

pub mod format;

pub use format::*;
