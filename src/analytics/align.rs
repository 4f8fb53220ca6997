//! Multi-store daily series on a shared, gap-free date axis.
//!
//! Unlike the inflation index, every calendar day of the window is present on
//! the axis. A store/day without observations is `None`, never `0.0` and never
//! interpolated; renderers pick their own gap policy.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::domain::{AlignedSeries, PriceObservation, StoreId, StoreSeries, Window};
use crate::math::round2;

/// Align every store present in `observations`, ascending by store id.
pub fn align_by_store(observations: &[PriceObservation], window: &Window) -> AlignedSeries {
    let stores: Vec<StoreId> = observations
        .iter()
        .filter(|o| window.contains(o.date))
        .map(|o| o.store_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    align_stores(observations, window, &stores)
}

/// Align an explicit list of stores, in the given order.
///
/// Stores with no observations in the window get an all-`None` series.
pub fn align_stores(observations: &[PriceObservation], window: &Window, stores: &[StoreId]) -> AlignedSeries {
    let dates: Vec<NaiveDate> = window.days().collect();

    let mut by_store: BTreeMap<StoreId, Vec<&PriceObservation>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| window.contains(o.date)) {
        by_store.entry(obs.store_id).or_default().push(obs);
    }

    let series: Vec<StoreSeries> = stores
        .par_iter()
        .map(|&store_id| {
            let store_obs = by_store.get(&store_id).map(Vec::as_slice).unwrap_or(&[]);
            StoreSeries {
                store_id,
                values: daily_means(store_obs, &dates),
            }
        })
        .collect();

    AlignedSeries {
        dates,
        stores: series,
    }
}

/// Mean price per axis date for one store's observations.
fn daily_means(observations: &[&PriceObservation], dates: &[NaiveDate]) -> Vec<Option<f64>> {
    let mut sums: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
    for obs in observations {
        let slot = sums.entry(obs.date).or_insert((0.0, 0));
        slot.0 += obs.price;
        slot.1 += 1;
    }

    dates
        .iter()
        .map(|d| sums.get(d).map(|&(sum, count)| round2(sum / count as f64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryId, ObservationId, ProductId};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
    }

    fn obs(id: u32, product: u32, store: u32, day: u32, price: f64) -> PriceObservation {
        PriceObservation {
            id: ObservationId(id),
            product_id: ProductId(product),
            store_id: StoreId(store),
            category_id: CategoryId(1),
            date: d(day),
            price,
        }
    }

    #[test]
    fn axis_covers_every_day_even_without_data() {
        let window = Window::new(d(1), d(28));
        let aligned = align_by_store(&[obs(1, 1, 1, 14, 5.0)], &window);
        assert_eq!(aligned.dates.len(), window.day_count());
        assert_eq!(aligned.dates.len(), 28);
        assert_eq!(aligned.dates.first(), Some(&d(1)));
        assert_eq!(aligned.dates.last(), Some(&d(28)));
        assert_eq!(aligned.stores.len(), 1);
        assert_eq!(aligned.stores[0].values.len(), 28);
        assert_eq!(aligned.stores[0].values.iter().filter(|v| v.is_some()).count(), 1);
    }

    #[test]
    fn absent_is_distinct_from_zero_average() {
        let window = Window::new(d(1), d(3));
        let aligned = align_by_store(&[obs(1, 1, 1, 1, 0.0)], &window);
        assert_eq!(aligned.stores[0].values, vec![Some(0.0), None, None]);
    }

    #[test]
    fn products_share_one_daily_mean_per_store() {
        let window = Window::new(d(1), d(2));
        let data = vec![
            obs(1, 1, 1, 1, 10.0),
            obs(2, 2, 1, 1, 20.0),
            obs(3, 1, 2, 1, 7.0),
            obs(4, 1, 2, 2, 8.0),
        ];
        let aligned = align_by_store(&data, &window);
        assert_eq!(aligned.stores[0].store_id, StoreId(1));
        assert_eq!(aligned.stores[0].values, vec![Some(15.0), None]);
        assert_eq!(aligned.stores[1].values, vec![Some(7.0), Some(8.0)]);
    }

    #[test]
    fn removing_a_store_leaves_others_untouched() {
        let window = Window::new(d(1), d(5));
        let data = vec![
            obs(1, 1, 1, 1, 10.0),
            obs(2, 1, 2, 1, 99.0),
            obs(3, 1, 1, 4, 11.0),
            obs(4, 1, 3, 2, 50.0),
        ];
        let without_store_2: Vec<_> = data.iter().filter(|o| o.store_id != StoreId(2)).cloned().collect();

        let full = align_by_store(&data, &window);
        let partial = align_by_store(&without_store_2, &window);

        let pick = |a: &AlignedSeries, s: u32| {
            a.stores
                .iter()
                .find(|x| x.store_id == StoreId(s))
                .map(|x| x.values.clone())
        };
        assert_eq!(pick(&full, 1), pick(&partial, 1));
        assert_eq!(pick(&full, 3), pick(&partial, 3));
        assert!(pick(&partial, 2).is_none());
    }

    #[test]
    fn explicit_store_without_data_is_all_absent() {
        let window = Window::new(d(1), d(2));
        let aligned = align_stores(&[obs(1, 1, 1, 1, 3.0)], &window, &[StoreId(1), StoreId(9)]);
        assert_eq!(aligned.stores[1].store_id, StoreId(9));
        assert_eq!(aligned.stores[1].values, vec![None, None]);
    }
}
