//! Cheapest-store ranking over each store's current basket.
//!
//! A store's basket holds one representative price per product it sells: the
//! price of that product's most recent observation in the window. When two
//! observations share the most recent date, the one with the higher
//! observation id (loaded or imported later) wins.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::domain::{BasketEntry, ObservationId, PriceObservation, ProductId, StoreId, Window};
use crate::math::round2;

/// Rank stores by average representative item price, cheapest first.
///
/// Stores without observations in the window do not appear. Ties on the
/// average are broken by ascending store id.
pub fn rank_stores(observations: &[PriceObservation], window: &Window) -> Vec<BasketEntry> {
    let mut by_store: BTreeMap<StoreId, Vec<&PriceObservation>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| window.contains(o.date)) {
        by_store.entry(obs.store_id).or_default().push(obs);
    }

    let mut entries: Vec<BasketEntry> = by_store
        .into_par_iter()
        .filter_map(|(store_id, obs)| store_basket(store_id, &obs))
        .collect();

    entries.sort_by(|a, b| {
        a.avg_item_price
            .total_cmp(&b.avg_item_price)
            .then(a.store_id.cmp(&b.store_id))
    });

    for e in &mut entries {
        e.total = round2(e.total);
        e.avg_item_price = round2(e.avg_item_price);
    }
    entries
}

/// Unrounded basket for one store; `None` when it has no items.
fn store_basket(store_id: StoreId, observations: &[&PriceObservation]) -> Option<BasketEntry> {
    let mut latest: BTreeMap<ProductId, (NaiveDate, ObservationId, f64)> = BTreeMap::new();
    for obs in observations {
        let candidate = (obs.date, obs.id, obs.price);
        latest
            .entry(obs.product_id)
            .and_modify(|cur| {
                if (candidate.0, candidate.1) > (cur.0, cur.1) {
                    *cur = candidate;
                }
            })
            .or_insert(candidate);
    }

    let item_count = latest.len();
    if item_count == 0 {
        return None;
    }
    let total: f64 = latest.values().map(|&(_, _, price)| price).sum();
    Some(BasketEntry {
        store_id,
        total,
        item_count,
        avg_item_price: total / item_count as f64,
    })
}
