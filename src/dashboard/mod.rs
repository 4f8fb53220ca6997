//! Dashboard aggregation.
//!
//! One request = one repository fetch. Filters (window, store, category) are
//! pushed down to the repository, and the index, aligner, and ranker all run on
//! that single filtered slice so their numbers always agree with each other.

use std::collections::HashSet;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analytics::{align_by_store, inflation_series, rank_stores};
use crate::domain::{
    ConfigError, DashboardBundle, DashboardConfig, ForecastConfig, PriceObservation, ProductId, ProductReport,
    SummaryCounts, Window,
};
use crate::forecast::forecast_product;
use crate::repo::{Dataset, ObservationFilter, ObservationRepository};

/// Build the dashboard bundle for `config` as of `today`.
///
/// Either the whole bundle is returned or nothing: the only failure is an
/// invalid config, checked before any data is touched.
pub fn build_dashboard<R: ObservationRepository + ?Sized>(
    repo: &R,
    config: &DashboardConfig,
    today: NaiveDate,
) -> Result<DashboardBundle, ConfigError> {
    config.validate()?;
    let started = Instant::now();

    let window = config.window(today);
    let filter = ObservationFilter::in_window(window)
        .with_store(config.store_filter)
        .with_category(config.category_filter);
    let observations = repo.observations(&filter);

    let bundle = compose(&observations, window);

    info!(
        start = %window.start,
        end = %window.end,
        observations = bundle.summary.observation_count,
        stores = bundle.basket.len(),
        "dashboard built"
    );
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "dashboard timings");
    Ok(bundle)
}

/// Run every window-level engine over one already-filtered slice.
pub fn compose(observations: &[PriceObservation], window: Window) -> DashboardBundle {
    let ((inflation, aligned), basket) = rayon::join(
        || {
            rayon::join(
                || inflation_series(observations, &window),
                || align_by_store(observations, &window),
            )
        },
        || rank_stores(observations, &window),
    );

    DashboardBundle {
        window,
        inflation,
        aligned,
        basket,
        summary: summarize(observations, &window),
    }
}

fn summarize(observations: &[PriceObservation], window: &Window) -> SummaryCounts {
    let in_window: Vec<&PriceObservation> = observations.iter().filter(|o| window.contains(o.date)).collect();
    SummaryCounts {
        observation_count: in_window.len(),
        product_count: in_window.iter().map(|o| o.product_id).collect::<HashSet<_>>().len(),
        store_count: in_window.iter().map(|o| o.store_id).collect::<HashSet<_>>().len(),
        category_count: in_window.iter().map(|o| o.category_id).collect::<HashSet<_>>().len(),
        day_count: window.day_count(),
    }
}

/// Full price history of a product (newest first) with its forecast.
pub fn product_report(
    dataset: &Dataset,
    product_id: ProductId,
    config: &ForecastConfig,
    today: NaiveDate,
) -> Result<ProductReport, ConfigError> {
    config.validate()?;
    let history = dataset.product_history(product_id);
    let forecast = forecast_product(dataset, product_id, config, today);
    debug!(product = %product_id, history = history.len(), status = ?forecast.status, "product report");
    Ok(ProductReport {
        product_id,
        history,
        forecast,
    })
}
