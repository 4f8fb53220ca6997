//! Shared workflow steps used by every command.
//!
//! Keeping this in one place avoids duplicating the boundary logic:
//! data path resolution -> CSV load -> name-to-id resolution -> config validation
//!
//! The command handlers in `app` then focus on presentation.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::cli::{DashboardArgs, FilterArgs, ForecastArgs};
use crate::dashboard::build_dashboard;
use crate::domain::{CategoryId, DashboardBundle, DashboardConfig, ForecastConfig, ProductId, StoreId};
use crate::error::AppError;
use crate::io::ingest::load_dataset;
use crate::report::FilterLabels;
use crate::repo::Dataset;

/// Environment variable naming the default data file.
pub const DATA_ENV: &str = "GT_DATA";

/// Data file used when neither `--data` nor `GT_DATA` is set.
pub const DEFAULT_DATA_FILE: &str = "prices.csv";

/// Store/category filters resolved against the catalog.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFilters {
    pub store: Option<StoreId>,
    pub category: Option<CategoryId>,
    pub labels: FilterLabels,
}

/// `--data`, else `$GT_DATA` (with `.env` loaded), else `prices.csv`.
pub fn resolve_data_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    dotenvy::dotenv().ok();
    std::env::var_os(DATA_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

pub fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Load the data file; a missing file is a usage error.
pub fn load(path: &Path) -> Result<Dataset, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!(
                "Data file '{}' not found. Create one with `gt seed` or `gt import`.",
                path.display()
            ),
        ));
    }
    let (dataset, report) = load_dataset(path)?;
    if report.failed() > 0 {
        warn!(skipped = report.failed(), "data file contains malformed rows");
    }
    Ok(dataset)
}

/// Load a data file that is about to be rewritten in full; start empty when
/// it does not exist yet.
///
/// A rewrite only persists rows that parsed, so any malformed row aborts with
/// exit code 2 and the file is left untouched.
pub fn load_for_rewrite(path: &Path) -> Result<Dataset, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "data file missing, starting empty");
        return Ok(Dataset::new());
    }

    let (dataset, report) = load_dataset(path)?;
    if report.failed() > 0 {
        let lines: Vec<String> = report
            .row_errors
            .iter()
            .map(|e| format!("line {}: {}", e.line, e.message))
            .collect();
        return Err(AppError::new(
            2,
            format!(
                "Data file '{}' has {} malformed row(s); fix them before it is rewritten:\n  {}",
                path.display(),
                report.failed(),
                lines.join("\n  ")
            ),
        ));
    }
    Ok(dataset)
}

pub fn resolve_filters(dataset: &Dataset, args: &FilterArgs) -> Result<ResolvedFilters, AppError> {
    let mut resolved = ResolvedFilters::default();

    if let Some(name) = args.store.as_deref() {
        let store = dataset
            .find_store(name)
            .ok_or_else(|| AppError::new(3, format!("Unknown store: '{name}'")))?;
        resolved.store = Some(store.id);
        resolved.labels.store = Some(store.name.clone());
    }
    if let Some(name) = args.category.as_deref() {
        let category = dataset
            .find_category(name)
            .ok_or_else(|| AppError::new(3, format!("Unknown category: '{name}'")))?;
        resolved.category = Some(category.id);
        resolved.labels.category = Some(category.name.clone());
    }

    Ok(resolved)
}

/// Resolve a product name; a name shared by several categories is an error.
pub fn resolve_product(dataset: &Dataset, name: &str) -> Result<ProductId, AppError> {
    match dataset.find_products(name).as_slice() {
        [] => Err(AppError::new(3, format!("Unknown product: '{name}'"))),
        [product] => Ok(product.id),
        several => {
            let categories: Vec<&str> = several
                .iter()
                .map(|p| dataset.category(p.category_id).map(|c| c.name.as_str()).unwrap_or("?"))
                .collect();
            Err(AppError::new(
                3,
                format!("Product name '{name}' is ambiguous; it exists in categories: {}", categories.join(", ")),
            ))
        }
    }
}

/// Validate dashboard flags and build the bundle.
pub fn run_dashboard(dataset: &Dataset, args: &DashboardArgs) -> Result<(DashboardBundle, FilterLabels), AppError> {
    let filters = resolve_filters(dataset, &args.filters)?;
    let config = DashboardConfig::new(args.days, filters.store, filters.category)?;
    let bundle = build_dashboard(dataset, &config, today_or_local(args.today))?;
    Ok((bundle, filters.labels))
}

pub fn forecast_config(args: &ForecastArgs) -> Result<ForecastConfig, AppError> {
    Ok(ForecastConfig::new(args.lookback, args.horizon)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Fruit and Vegetables");
        ds.ensure_product("Bananas", cat);
        ds.ensure_store("Magnit");
        ds
    }

    #[test]
    fn explicit_flag_wins_over_environment() {
        let path = resolve_data_path(Some(Path::new("mine.csv")));
        assert_eq!(path, PathBuf::from("mine.csv"));
    }

    #[test]
    fn filters_resolve_by_name_and_slug() {
        let ds = dataset();
        let args = FilterArgs {
            store: Some("magnit".to_string()),
            category: Some("fruit-and-vegetables".to_string()),
        };
        let resolved = resolve_filters(&ds, &args).unwrap();
        assert_eq!(resolved.store, Some(StoreId(1)));
        assert_eq!(resolved.category, Some(CategoryId(1)));
        assert_eq!(resolved.labels.store.as_deref(), Some("Magnit"));
    }

    #[test]
    fn unknown_names_exit_with_no_data_code() {
        let ds = dataset();
        let args = FilterArgs {
            store: Some("Nowhere".to_string()),
            category: None,
        };
        assert_eq!(resolve_filters(&ds, &args).unwrap_err().exit_code(), 3);
        assert_eq!(resolve_product(&ds, "Caviar").unwrap_err().exit_code(), 3);
    }

    #[test]
    fn missing_data_file_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert_eq!(load(&path).unwrap_err().exit_code(), 2);
        assert!(load_for_rewrite(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_rows_block_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(
            &path,
            "Product,Category,Store,Price,Date\nMilk,Dairy,Alpha,80,2025-10-01\nMilk,Dairy,Alpha,81,01/10/2025\n",
        )
        .unwrap();

        assert_eq!(load(&path).unwrap().all_observations().len(), 1);
        let err = load_for_rewrite(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 3: Invalid date '01/10/2025'"));
    }

    #[test]
    fn ambiguous_product_name_lists_categories() {
        let mut ds = dataset();
        let dairy = ds.ensure_category("Dairy");
        let vegan = ds.ensure_category("Vegan");
        let milk = ds.ensure_product("Milk", dairy);
        ds.ensure_product("Milk", vegan);

        let err = resolve_product(&ds, "milk").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Dairy, Vegan"));
        assert_eq!(resolve_product(&ds, "BANANAS").unwrap(), ProductId(1));
        assert_ne!(milk, ProductId(1));
    }
}
