//! Write observations back out in the interchange CSV format.
//!
//! The export is meant to be easy to consume in spreadsheets and to re-import
//! with `gt import`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::PriceObservation;
use crate::error::AppError;
use crate::io::ingest::{CSV_COLUMNS, CSV_DATE_FORMAT};
use crate::repo::Dataset;

/// Export `observations` sorted by date, then product name, then store name.
pub fn write_observations_csv(
    path: &Path,
    dataset: &Dataset,
    observations: &[PriceObservation],
) -> Result<usize, AppError> {
    let mut rows: Vec<&PriceObservation> = observations.iter().collect();
    rows.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| product_name(dataset, a).cmp(product_name(dataset, b)))
            .then_with(|| store_name(dataset, a).cmp(store_name(dataset, b)))
    });

    let file = create(path)?;
    write_rows(file, dataset, rows.into_iter())
}

/// Persist the whole dataset in insertion order, so a reload yields the same ids.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<usize, AppError> {
    let file = create(path)?;
    write_rows(file, dataset, dataset.all_observations().iter())
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(4, format!("Failed to create CSV '{}': {e}", path.display())))
}

/// Write the header plus one row per observation; returns the row count.
pub fn write_rows<'a, W: Write>(
    writer: W,
    dataset: &Dataset,
    rows: impl Iterator<Item = &'a PriceObservation>,
) -> Result<usize, AppError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_COLUMNS)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    let mut written = 0usize;
    for obs in rows {
        let category = dataset
            .category(obs.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        let price = format!("{:.2}", obs.price);
        let date = obs.date.format(CSV_DATE_FORMAT).to_string();
        out.write_record([
            product_name(dataset, obs),
            category,
            store_name(dataset, obs),
            price.as_str(),
            date.as_str(),
        ])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
        written += 1;
    }

    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(written)
}

fn product_name<'a>(dataset: &'a Dataset, obs: &PriceObservation) -> &'a str {
    dataset.product(obs.product_id).map(|p| p.name.as_str()).unwrap_or_default()
}

fn store_name<'a>(dataset: &'a Dataset, obs: &PriceObservation) -> &'a str {
    dataset.store(obs.store_id).map(|s| s.name.as_str()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rows_use_interchange_format_and_quote_commas() {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Dairy");
        let milk = ds.ensure_product("Milk, 3.2%", cat);
        let store = ds.ensure_store("Alpha");
        ds.push_observation(milk, store, NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(), 80.5);

        let mut buf = Vec::new();
        let n = write_rows(&mut buf, &ds, ds.all_observations().iter()).unwrap();
        assert_eq!(n, 1);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Product,Category,Store,Price,Date\n\"Milk, 3.2%\",Dairy,Alpha,80.50,2025-01-09\n"
        );
    }
}
