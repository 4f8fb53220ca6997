//! Command-line parsing for the grocery price analytics tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analytics code. Names given on the command line are resolved to ids in
//! `app`, not here.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_DASHBOARD_DAYS, DEFAULT_FORECAST_HORIZON_DAYS, DEFAULT_FORECAST_LOOKBACK_DAYS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gt", version, about = "Grocery price trends: forecasts, basket index, store ranking")]
pub struct Cli {
    /// Observation CSV (`Product,Category,Store,Price,Date`).
    ///
    /// Defaults to `$GT_DATA` (also read from `.env`), then `prices.csv`.
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Basket index, per-store daily series, and cheapest-store ranking.
    Dashboard(DashboardArgs),
    /// Linear-trend price forecast for one product.
    Forecast(ForecastArgs),
    /// Price history of one product plus its forecast.
    Product(ForecastArgs),
    /// List categories, products, and stores.
    Catalog,
    /// Merge a CSV file into the data file (upsert by product, store, date).
    Import(ImportArgs),
    /// Export observations in the interchange CSV format.
    Export(ExportArgs),
    /// Write a deterministic demo dataset to the data file.
    Seed(SeedArgs),
}

/// Store/category filters shared by window-level commands.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// Only observations from this store (name, case-insensitive).
    #[arg(long)]
    pub store: Option<String>,

    /// Only observations in this category (name or slug).
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Lookback window in days, ending today.
    #[arg(long, default_value_t = DEFAULT_DASHBOARD_DAYS)]
    pub days: u32,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date.
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,

    /// Also write the bundle as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Product name (case-insensitive).
    #[arg(short, long)]
    pub product: String,

    /// History used for the fit, in days.
    #[arg(long, default_value_t = DEFAULT_FORECAST_LOOKBACK_DAYS)]
    pub lookback: u32,

    /// How many days ahead to predict.
    #[arg(long, default_value_t = DEFAULT_FORECAST_HORIZON_DAYS)]
    pub horizon: u32,

    /// Evaluate as of this date (YYYY-MM-DD) instead of the local date.
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,

    /// Also write the result as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// CSV file to merge.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Destination CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Only the last N days (all history when omitted).
    #[arg(long)]
    pub days: Option<u32>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Window end for `--days` (YYYY-MM-DD); defaults to the local date.
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct SeedArgs {
    /// Random seed; the same seed always produces the same data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Days of history per product.
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Last day of generated history (YYYY-MM-DD); defaults to the local date.
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,

    /// Overwrite a data file that already holds observations.
    #[arg(long)]
    pub force: bool,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}
