//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - aggregated in-memory by the analytics engines
//! - exported to JSON for the presentation layer
//! - compared exactly in tests (all outputs are plain data)

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Identifier of a catalog product.
    ProductId
);
id_type!(
    /// Identifier of a store.
    StoreId
);
id_type!(
    /// Identifier of a product category.
    CategoryId
);
id_type!(
    /// Identifier of a single price observation.
    ///
    /// Assigned in load/import order; used as the deterministic tie-break when
    /// two observations of the same product/store share a date.
    ObservationId
);

/// One dated shelf price of a product at a store.
///
/// Observations are never mutated by the analytics code. Upstream data may
/// contain several observations for the same `(product, store, date)`; every
/// engine aggregates them instead of assuming uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub id: ObservationId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub date: NaiveDate,
    pub price: f64,
}

/// Inclusive calendar-day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The trailing window `[today - days, today]`.
    pub fn lookback(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the window, both ends included.
    pub fn day_count(&self) -> usize {
        let span = (self.end - self.start).num_days();
        if span < 0 { 0 } else { span as usize + 1 }
    }

    /// Every calendar day of the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count())
    }
}

// --- Catalog -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
}

/// Derive a URL slug from a display name: lower-cased, whitespace runs become `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// --- Engine outputs ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Success,
    InsufficientData,
}

/// Linear-trend forecast for one product.
///
/// Numeric fields are present only when `status == Success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub status: ForecastStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_trend: Option<f64>,
    /// Observations fed to the fit.
    pub points_used: usize,
}

impl ForecastResult {
    pub fn insufficient(points_used: usize) -> Self {
        Self {
            status: ForecastStatus::InsufficientData,
            r2_score: None,
            predicted_price: None,
            daily_trend: None,
            points_used,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ForecastStatus::Success
    }
}

/// One day of the basket-proxy index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationPoint {
    pub date: NaiveDate,
    pub average_price: f64,
}

/// Unweighted daily mean of every observed price, plus its relative change.
///
/// Days with no observations are omitted, so consecutive points may skip days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationSeries {
    pub points: Vec<InflationPoint>,
    pub change_percent: f64,
}

/// Daily averages of one store, parallel to `AlignedSeries::dates`.
///
/// `None` marks a day without observations (serialized as `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSeries {
    pub store_id: StoreId,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub dates: Vec<NaiveDate>,
    pub stores: Vec<StoreSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub store_id: StoreId,
    pub total: f64,
    pub item_count: usize,
    pub avg_item_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub observation_count: usize,
    pub product_count: usize,
    pub store_count: usize,
    pub category_count: usize,
    pub day_count: usize,
}

/// Everything the dashboard shows for one filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardBundle {
    pub window: Window,
    pub inflation: InflationSeries,
    pub aligned: AlignedSeries,
    /// Cheapest basket first.
    pub basket: Vec<BasketEntry>,
    pub summary: SummaryCounts,
}

/// Price history of a single product, newest first, with its forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub product_id: ProductId,
    pub history: Vec<PriceObservation>,
    pub forecast: ForecastResult,
}
