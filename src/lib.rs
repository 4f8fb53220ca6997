//! `grocery-trends` library crate.
//!
//! The binary (`gt`) is a thin wrapper around this library so that:
//!
//! - the engines are testable without spawning processes
//! - the dashboard bundle can be reused by other front ends (JSON consumers, services)
//! - code stays easy to navigate as the project grows

pub mod analytics;
pub mod app;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod repo;
pub mod report;
