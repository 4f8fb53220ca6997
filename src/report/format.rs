//! Formatted terminal output for dashboards, forecasts, and the catalog.
//!
//! We keep formatting code in one place so:
//! - the engines stay free of presentation concerns
//! - output changes are localized (stable text for snapshot-style tests)

use crate::domain::{DashboardBundle, ForecastResult, ForecastStatus, ProductId, ProductReport, StoreId};
use crate::io::ingest::ImportReport;
use crate::repo::Dataset;

/// Width of name columns in tables.
const NAME_WIDTH: usize = 24;

/// Human-readable description of the active filters.
#[derive(Debug, Clone, Default)]
pub struct FilterLabels {
    pub store: Option<String>,
    pub category: Option<String>,
}

/// Format the full dashboard: summary, basket index, store ranking, aligned series.
pub fn format_dashboard(bundle: &DashboardBundle, dataset: &Dataset, filters: &FilterLabels) -> String {
    let mut out = String::new();

    out.push_str("=== gt - Grocery Price Dashboard ===\n");
    out.push_str(&format!(
        "Window: {} .. {} ({} days)\n",
        bundle.window.start, bundle.window.end, bundle.summary.day_count
    ));
    out.push_str(&format!(
        "Filters: store={} | category={}\n",
        filters.store.as_deref().unwrap_or("(all)"),
        filters.category.as_deref().unwrap_or("(all)"),
    ));
    out.push_str(&format!(
        "Observations: n={} | products={} | stores={} | categories={}\n",
        bundle.summary.observation_count,
        bundle.summary.product_count,
        bundle.summary.store_count,
        bundle.summary.category_count,
    ));

    out.push_str(&format!(
        "\nBasket index ({} days with data, change {:+.2}%):\n",
        bundle.inflation.points.len(),
        bundle.inflation.change_percent
    ));
    if bundle.inflation.points.is_empty() {
        out.push_str("  (no observations in window)\n");
    }
    for p in &bundle.inflation.points {
        out.push_str(&format!("  {}  {:>10.2}\n", p.date, p.average_price));
    }

    out.push_str("\nCheapest stores:\n");
    out.push_str(&format_basket_table(bundle, dataset));

    out.push_str("\nDaily average by store:\n");
    out.push_str(&format_aligned_table(bundle, dataset));

    out
}

fn format_basket_table(bundle: &DashboardBundle, dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} {:<NAME_WIDTH$} {:>6} {:>12} {:>12}\n",
        "rank", "store", "items", "total", "avg_item"
    ));
    out.push_str(&format!(
        "{:->4} {:-<NAME_WIDTH$} {:->6} {:->12} {:->12}\n",
        "", "", "", "", ""
    ));
    for (i, e) in bundle.basket.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} {:<NAME_WIDTH$} {:>6} {:>12.2} {:>12.2}\n",
            i + 1,
            truncate(&store_label(dataset, e.store_id), NAME_WIDTH),
            e.item_count,
            e.total,
            e.avg_item_price,
        ));
    }
    out
}

fn format_aligned_table(bundle: &DashboardBundle, dataset: &Dataset) -> String {
    const COL: usize = 12;
    let mut out = String::new();

    let mut header = format!("{:<10}", "date");
    for s in &bundle.aligned.stores {
        header.push_str(&format!(" {:>COL$}", truncate(&store_label(dataset, s.store_id), COL)));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (i, date) in bundle.aligned.dates.iter().enumerate() {
        let mut line = format!("{date}");
        for s in &bundle.aligned.stores {
            let cell = match s.values.get(i).copied().flatten() {
                Some(v) => format!("{v:.2}"),
                None => "-".to_string(),
            };
            line.push_str(&format!(" {cell:>COL$}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Format a single forecast.
pub fn format_forecast(product: &str, forecast: &ForecastResult, horizon_days: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("Forecast for {product}:\n"));
    match forecast.status {
        ForecastStatus::InsufficientData => {
            out.push_str(&format!(
                "- status: insufficient data ({} observations in window)\n",
                forecast.points_used
            ));
        }
        ForecastStatus::Success => {
            out.push_str(&format!("- observations: {}\n", forecast.points_used));
            if let Some(p) = forecast.predicted_price {
                out.push_str(&format!("- predicted price in {horizon_days} days: {p:.2}\n"));
            }
            if let Some(t) = forecast.daily_trend {
                out.push_str(&format!("- daily trend: {t:+.2}\n"));
            }
            if let Some(r2) = forecast.r2_score {
                out.push_str(&format!("- fit R²: {r2:.2}\n"));
            }
        }
    }
    out
}

/// Format a product's history (newest first) followed by its forecast.
pub fn format_product_report(report: &ProductReport, dataset: &Dataset, horizon_days: u32) -> String {
    let name = product_label(dataset, report.product_id);
    let mut out = String::new();

    out.push_str(&format!("=== {name} ===\n"));
    if let Some(cat) = dataset
        .product(report.product_id)
        .and_then(|p| dataset.category(p.category_id))
    {
        out.push_str(&format!("Category: {}\n", cat.name));
    }

    out.push_str(&format!("\nPrice history ({} records):\n", report.history.len()));
    out.push_str(&format!("{:<10} {:<NAME_WIDTH$} {:>10}\n", "date", "store", "price"));
    for obs in &report.history {
        out.push_str(&format!(
            "{:<10} {:<NAME_WIDTH$} {:>10.2}\n",
            obs.date,
            truncate(&store_label(dataset, obs.store_id), NAME_WIDTH),
            obs.price
        ));
    }
    out.push('\n');
    out.push_str(&format_forecast(&name, &report.forecast, horizon_days));
    out
}

/// Format the catalog: categories, products (with category), stores.
pub fn format_catalog(dataset: &Dataset) -> String {
    let mut out = String::new();

    out.push_str(&format!("Categories ({}):\n", dataset.categories().len()));
    for c in dataset.categories() {
        out.push_str(&format!("  {:>3}  {} [{}]\n", c.id, c.name, c.slug));
    }

    out.push_str(&format!("\nProducts ({}):\n", dataset.products().len()));
    for p in dataset.products() {
        let category = dataset.category(p.category_id).map(|c| c.name.as_str()).unwrap_or("?");
        out.push_str(&format!("  {:>3}  {:<NAME_WIDTH$} {}\n", p.id, truncate(&p.name, NAME_WIDTH), category));
    }

    out.push_str(&format!("\nStores ({}):\n", dataset.stores().len()));
    for s in dataset.stores() {
        out.push_str(&format!("  {:>3}  {}\n", s.id, s.name));
    }
    out
}

/// One-line import summary plus the skipped rows.
pub fn format_import_report(report: &ImportReport) -> String {
    let mut out = format!(
        "Import: rows={} | created={} | updated={} | failed={}\n",
        report.rows_read,
        report.created,
        report.updated,
        report.failed()
    );
    for e in &report.row_errors {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    out
}

fn store_label(dataset: &Dataset, id: StoreId) -> String {
    dataset
        .store(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| format!("store #{id}"))
}

fn product_label(dataset: &Dataset, id: ProductId) -> String {
    dataset
        .product(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("product #{id}"))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::dashboard::compose;
    use crate::domain::Window;
    use crate::io::ingest::RowError;

    fn dataset() -> Dataset {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Dairy");
        let milk = ds.ensure_product("Milk", cat);
        let a = ds.ensure_store("Alpha");
        let b = ds.ensure_store("Beta");
        ds.push_observation(milk, a, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 80.0);
        ds.push_observation(milk, b, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(), 70.0);
        ds
    }

    #[test]
    fn dashboard_marks_absent_days() {
        let ds = dataset();
        let window = Window::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        );
        let bundle = compose(ds.all_observations(), window);
        let text = format_dashboard(&bundle, &ds, &FilterLabels::default());

        assert!(text.contains("Window: 2025-01-01 .. 2025-01-03 (3 days)"));
        assert!(text.contains("change -12.50%"));
        assert!(text.contains("2025-01-02            -            -"));
        // Beta is cheaper, so it ranks first.
        let beta = text.find("   1 Beta").unwrap();
        let alpha = text.find("   2 Alpha").unwrap();
        assert!(beta < alpha);
    }

    #[test]
    fn insufficient_forecast_is_reported_plainly() {
        let text = format_forecast("Milk", &ForecastResult::insufficient(2), 30);
        assert!(text.contains("insufficient data (2 observations in window)"));
    }

    #[test]
    fn import_report_lists_failed_lines() {
        let report = ImportReport {
            rows_read: 3,
            created: 1,
            updated: 1,
            row_errors: vec![RowError {
                line: 4,
                message: "Invalid price 'x'.".to_string(),
            }],
        };
        let text = format_import_report(&report);
        assert!(text.starts_with("Import: rows=3 | created=1 | updated=1 | failed=1"));
        assert!(text.contains("line 4: Invalid price 'x'."));
    }

    #[test]
    fn catalog_ids_are_right_aligned() {
        let text = format_catalog(&dataset());
        assert!(text.contains("\n    1  Dairy [dairy]\n"));
        assert!(text.contains("\n    2  Beta\n"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Perekrestok", 6), "Perek.");
        assert_eq!(truncate("Alpha", 6), "Alpha");
    }
}
