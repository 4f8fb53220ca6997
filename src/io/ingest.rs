//! CSV ingest for the `Product,Category,Store,Price,Date` interchange format.
//!
//! Two entry points share one row parser:
//! - `load_dataset` reads a data file as-is (duplicates are kept, the engines
//!   aggregate them)
//! - `import_csv` merges a file into an existing dataset, upserting by the
//!   natural key `(product + category, store, date)`
//!
//! Design goals:
//! - **Strict schema** for the header (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, keep going, report them)
//! - **Deterministic behavior** (ids follow file order)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::error::AppError;
use crate::math::round2;
use crate::repo::{Dataset, UpsertOutcome};

/// Column names of the interchange format, in export order.
pub const CSV_COLUMNS: [&str; 5] = ["Product", "Category", "Store", "Price", "Date"];

/// Date format used by the interchange files.
pub const CSV_DATE_FORMAT: &str = "%Y-%m-%d";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Outcome counts of one load or import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub rows_read: usize,
    pub created: usize,
    pub updated: usize,
    pub row_errors: Vec<RowError>,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.row_errors.len()
    }

    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }
}

/// One validated CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub product: String,
    pub category: String,
    pub store: String,
    pub price: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestMode {
    Append,
    Upsert,
}

/// Load a data file into a fresh dataset, keeping every valid row.
pub fn load_dataset(path: &Path) -> Result<(Dataset, ImportReport), AppError> {
    let file = open(path)?;
    let mut dataset = Dataset::new();
    let report = ingest(file, &mut dataset, IngestMode::Append)?;
    info!(
        path = %path.display(),
        observations = report.created,
        skipped = report.failed(),
        "loaded dataset"
    );
    Ok((dataset, report))
}

/// Merge a CSV file into `dataset`.
pub fn import_csv(dataset: &mut Dataset, path: &Path) -> Result<ImportReport, AppError> {
    let file = open(path)?;
    let report = import_reader(dataset, file)?;
    info!(
        path = %path.display(),
        created = report.created,
        updated = report.updated,
        failed = report.failed(),
        "import finished"
    );
    Ok(report)
}

/// Merge CSV content from any reader into `dataset`.
pub fn import_reader<R: Read>(dataset: &mut Dataset, reader: R) -> Result<ImportReport, AppError> {
    ingest(reader, dataset, IngestMode::Upsert)
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))
}

fn ingest<R: Read>(reader: R, dataset: &mut Dataset, mode: IngestMode) -> Result<ImportReport, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut report = ImportReport::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, and lines are 1-based.
        let line = idx + 2;
        report.rows_read += 1;

        let row = match result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map))
        {
            Ok(row) => row,
            Err(message) => {
                warn!(line, %message, "skipping malformed row");
                report.row_errors.push(RowError { line, message });
                continue;
            }
        };

        let category_id = dataset.ensure_category(&row.category);
        let product_id = dataset.ensure_product(&row.product, category_id);
        let store_id = dataset.ensure_store(&row.store);

        let outcome = match mode {
            IngestMode::Append => dataset
                .push_observation(product_id, store_id, row.date, row.price)
                .map(|_| UpsertOutcome::Created),
            IngestMode::Upsert => dataset.upsert_observation(product_id, store_id, row.date, row.price),
        };
        match outcome {
            Some(UpsertOutcome::Created) => report.created += 1,
            Some(UpsertOutcome::Updated) => report.updated += 1,
            None => {
                let message = format!("Product '{}' could not be added to the catalog.", row.product);
                warn!(line, %message, "skipping row");
                report.row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(report)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes start with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in CSV_COLUMNS {
        if !header_map.contains_key(&column.to_ascii_lowercase()) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }
    Ok(())
}

/// Parse and validate one record.
pub fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<PriceRow, String> {
    let product = get_required(record, header_map, "product")?.to_string();
    let category = get_required(record, header_map, "category")?.to_string();
    let store = get_required(record, header_map, "store")?.to_string();
    let price = parse_price(get_required(record, header_map, "price")?)?;
    let date = parse_date(get_required(record, header_map, "date")?)?;

    Ok(PriceRow {
        product,
        category,
        store,
        price,
        date,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Prices are stored with two decimals, the precision the data file keeps.
fn parse_price(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map(round2)
        .map_err(|_| format!("Invalid price '{s}'."))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(format!("Price must be a positive number, got '{s}'."));
    }
    Ok(v)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, CSV_DATE_FORMAT).map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Product,Category,Store,Price,Date
Milk,Dairy,Alpha,80.50,2025-03-01
Milk,Dairy,Beta,82,2025-03-01
Bread,Bakery,Alpha,45,2025-03-02
";

    #[test]
    fn import_creates_catalog_and_observations() {
        let mut ds = Dataset::new();
        let report = import_reader(&mut ds, CSV.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.created, 3);
        assert_eq!(report.updated, 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(ds.products().len(), 2);
        assert_eq!(ds.stores().len(), 2);
        assert_eq!(ds.categories().len(), 2);
    }

    #[test]
    fn reimport_updates_instead_of_duplicating() {
        let mut ds = Dataset::new();
        import_reader(&mut ds, CSV.as_bytes()).unwrap();
        let again = "Product,Category,Store,Price,Date\nMilk,Dairy,Alpha,79.90,2025-03-01\n";
        let report = import_reader(&mut ds, again.as_bytes()).unwrap();
        assert_eq!((report.created, report.updated), (0, 1));
        assert_eq!(ds.all_observations().len(), 3);
        assert_eq!(ds.all_observations()[0].price, 79.90);
    }

    #[test]
    fn malformed_rows_are_skipped_and_counted() {
        let csv = "\
product,category,store,price,date
Milk,Dairy,Alpha,abc,2025-03-01
Milk,Dairy,Alpha,10,03/01/2025
,Dairy,Alpha,10,2025-03-01
Milk,Dairy,Alpha,-3,2025-03-01
Milk,Dairy,Alpha,12,2025-03-04
";
        let mut ds = Dataset::new();
        let report = import_reader(&mut ds, csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 4);
        let lines: Vec<usize> = report.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert_eq!(ds.all_observations().len(), 1);
    }

    #[test]
    fn prices_keep_two_decimals_through_a_rewrite() {
        let csv = "\
Product,Category,Store,Price,Date
Milk,Dairy,Alpha,80.126,2025-03-01
Salt,Pantry,Alpha,0.004,2025-03-01
";
        let mut ds = Dataset::new();
        let report = import_reader(&mut ds, csv.as_bytes()).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(ds.all_observations()[0].price, 80.13);

        let mut buf = Vec::new();
        crate::io::export::write_rows(&mut buf, &ds, ds.all_observations().iter()).unwrap();
        let mut reloaded = Dataset::new();
        import_reader(&mut reloaded, buf.as_slice()).unwrap();
        assert_eq!(reloaded.all_observations()[0].price, ds.all_observations()[0].price);
    }

    #[test]
    fn missing_column_rejects_the_file() {
        let mut ds = Dataset::new();
        let err = import_reader(&mut ds, "Product,Category,Store,Price\nMilk,Dairy,A,1\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Date"));
    }

    #[test]
    fn header_with_bom_is_accepted() {
        let csv = "\u{feff}Product,Category,Store,Price,Date\nMilk,Dairy,A,1,2025-01-01\n";
        let mut ds = Dataset::new();
        let report = import_reader(&mut ds, csv.as_bytes()).unwrap();
        assert_eq!(report.created, 1);
    }
}
