//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads the data file
//! - runs the requested engine
//! - prints reports and writes optional JSON/CSV outputs

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DashboardArgs, ExportArgs, ForecastArgs, ImportArgs, SeedArgs};
use crate::dashboard::product_report;
use crate::data::{generate_sample, SampleConfig};
use crate::domain::Window;
use crate::error::AppError;
use crate::forecast::forecast_product;
use crate::io::{import_csv, write_dataset_csv, write_json, write_observations_csv};
use crate::repo::{ObservationFilter, ObservationRepository};

pub mod pipeline;

use pipeline::{
    forecast_config, load, load_for_rewrite, resolve_data_path, resolve_filters, resolve_product, run_dashboard,
    today_or_local,
};

/// Environment variable holding the log filter (e.g. `grocery_trends=debug`).
pub const LOG_ENV: &str = "GT_LOG";

const DEFAULT_LOG_FILTER: &str = "grocery_trends=info";

/// Entry point for the `gt` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing();

    let data_path = resolve_data_path(cli.data.as_deref());

    match cli.command {
        Command::Dashboard(args) => handle_dashboard(&data_path, args),
        Command::Forecast(args) => handle_forecast(&data_path, args),
        Command::Product(args) => handle_product(&data_path, args),
        Command::Catalog => handle_catalog(&data_path),
        Command::Import(args) => handle_import(&data_path, args),
        Command::Export(args) => handle_export(&data_path, args),
        Command::Seed(args) => handle_seed(&data_path, args),
    }
}

/// Log to stderr so stdout carries only reports.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_dashboard(data_path: &std::path::Path, args: DashboardArgs) -> Result<(), AppError> {
    let dataset = load(data_path)?;
    let (bundle, labels) = run_dashboard(&dataset, &args)?;

    println!("{}", crate::report::format_dashboard(&bundle, &dataset, &labels));

    if let Some(path) = &args.json {
        write_json(path, &bundle)?;
        info!(path = %path.display(), "wrote dashboard JSON");
    }
    Ok(())
}

fn handle_forecast(data_path: &std::path::Path, args: ForecastArgs) -> Result<(), AppError> {
    let dataset = load(data_path)?;
    let config = forecast_config(&args)?;
    let product_id = resolve_product(&dataset, &args.product)?;
    let result = forecast_product(&dataset, product_id, &config, today_or_local(args.today));

    let name = dataset.product(product_id).map(|p| p.name.as_str()).unwrap_or(&args.product);
    println!("{}", crate::report::format_forecast(name, &result, config.horizon_days));

    if let Some(path) = &args.json {
        write_json(path, &result)?;
        info!(path = %path.display(), "wrote forecast JSON");
    }
    Ok(())
}

fn handle_product(data_path: &std::path::Path, args: ForecastArgs) -> Result<(), AppError> {
    let dataset = load(data_path)?;
    let config = forecast_config(&args)?;
    let product_id = resolve_product(&dataset, &args.product)?;
    let report = product_report(&dataset, product_id, &config, today_or_local(args.today))?;

    println!(
        "{}",
        crate::report::format_product_report(&report, &dataset, config.horizon_days)
    );

    if let Some(path) = &args.json {
        write_json(path, &report)?;
        info!(path = %path.display(), "wrote product report JSON");
    }
    Ok(())
}

fn handle_catalog(data_path: &std::path::Path) -> Result<(), AppError> {
    let dataset = load(data_path)?;
    println!("{}", crate::report::format_catalog(&dataset));
    Ok(())
}

fn handle_import(data_path: &std::path::Path, args: ImportArgs) -> Result<(), AppError> {
    let mut dataset = load_for_rewrite(data_path)?;
    let report = import_csv(&mut dataset, &args.csv)?;
    write_dataset_csv(data_path, &dataset)?;

    println!("{}", crate::report::format_import_report(&report));
    Ok(())
}

fn handle_export(data_path: &std::path::Path, args: ExportArgs) -> Result<(), AppError> {
    let dataset = load(data_path)?;
    let filters = resolve_filters(&dataset, &args.filters)?;

    let mut filter = ObservationFilter::default()
        .with_store(filters.store)
        .with_category(filters.category);
    if let Some(days) = args.days {
        if days == 0 {
            return Err(AppError::new(2, "--days must be a positive number of days"));
        }
        filter.window = Some(Window::lookback(today_or_local(args.today), days));
    }

    let observations = dataset.observations(&filter);
    let written = write_observations_csv(&args.out, &dataset, &observations)?;
    info!(path = %args.out.display(), rows = written, "export finished");
    println!("Exported {written} observations to {}", args.out.display());
    Ok(())
}

fn handle_seed(data_path: &std::path::Path, args: SeedArgs) -> Result<(), AppError> {
    if !args.force && !load_for_rewrite(data_path)?.is_empty() {
        println!(
            "Data file '{}' already contains observations. Skipping seed (use --force to overwrite).",
            data_path.display()
        );
        return Ok(());
    }

    let config = SampleConfig {
        seed: args.seed,
        days: args.days,
        today: today_or_local(args.today),
    };
    let dataset = generate_sample(&config)?;
    let written = write_dataset_csv(data_path, &dataset)?;

    info!(path = %data_path.display(), rows = written, seed = args.seed, "seeded data file");
    println!("Seeded {written} observations into {}", data_path.display());
    Ok(())
}
