//! Observation repository boundary.
//!
//! The engines never query storage. They receive observation sequences that a
//! repository has already filtered (window, product, store, category) and
//! sorted ascending by date.

pub mod dataset;

pub use dataset::*;

use crate::domain::{CategoryId, PriceObservation, ProductId, StoreId, Window};

/// Predicates pushed down to the repository. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub window: Option<Window>,
    pub product: Option<ProductId>,
    pub store: Option<StoreId>,
    pub category: Option<CategoryId>,
}

impl ObservationFilter {
    pub fn in_window(window: Window) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn with_product(mut self, product: Option<ProductId>) -> Self {
        self.product = product;
        self
    }

    pub fn with_store(mut self, store: Option<StoreId>) -> Self {
        self.store = store;
        self
    }

    pub fn with_category(mut self, category: Option<CategoryId>) -> Self {
        self.category = category;
        self
    }

    pub fn matches(&self, obs: &PriceObservation) -> bool {
        self.window.is_none_or(|w| w.contains(obs.date))
            && self.product.is_none_or(|p| p == obs.product_id)
            && self.store.is_none_or(|s| s == obs.store_id)
            && self.category.is_none_or(|c| c == obs.category_id)
    }
}

/// Source of already-validated price observations.
pub trait ObservationRepository {
    /// Observations matching `filter`, sorted ascending by date.
    ///
    /// Observations sharing a date keep their insertion order.
    fn observations(&self, filter: &ObservationFilter) -> Vec<PriceObservation>;
}

/// Apply `filter` to an in-memory slice and return the matches sorted by date.
pub fn filter_sorted(observations: &[PriceObservation], filter: &ObservationFilter) -> Vec<PriceObservation> {
    let mut out: Vec<PriceObservation> = observations
        .iter()
        .filter(|o| filter.matches(o))
        .cloned()
        .collect();
    out.sort_by_key(|o| o.date);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::ObservationId;

    fn obs(id: u32, store: u32, category: u32, day: u32) -> PriceObservation {
        PriceObservation {
            id: ObservationId(id),
            product_id: ProductId(1),
            store_id: StoreId(store),
            category_id: CategoryId(category),
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            price: 10.0,
        }
    }

    #[test]
    fn filter_combines_all_predicates() {
        let window = Window::new(
            NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
        );
        let filter = ObservationFilter::in_window(window)
            .with_store(Some(StoreId(2)))
            .with_category(Some(CategoryId(7)));

        assert!(filter.matches(&obs(1, 2, 7, 3)));
        assert!(!filter.matches(&obs(2, 1, 7, 3)));
        assert!(!filter.matches(&obs(3, 2, 8, 3)));
        assert!(!filter.matches(&obs(4, 2, 7, 5)));
    }

    #[test]
    fn filter_sorted_is_stable_by_date() {
        let data = vec![obs(1, 1, 1, 3), obs(2, 1, 1, 1), obs(3, 2, 1, 3), obs(4, 1, 1, 2)];
        let out = filter_sorted(&data, &ObservationFilter::default());
        let ids: Vec<u32> = out.iter().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }
}
