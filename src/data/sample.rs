//! Deterministic demo dataset.
//!
//! Mirrors a small grocery catalog: four categories, three stores, eight
//! products. Each product gets a base price in `[50, 500]` and one observation
//! per day at a randomly chosen store, jittered by up to ±20.

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::AppError;
use crate::repo::Dataset;

const CATEGORIES: [&str; 4] = ["Dairy", "Fruit and Vegetables", "Meat and Poultry", "Pantry"];

const STORES: [&str; 3] = ["Pyaterochka", "Magnit", "Perekrestok"];

/// `(product name, index into CATEGORIES)`
const PRODUCTS: [(&str, usize); 8] = [
    ("Milk 3.2%", 0),
    ("Cottage Cheese 5%", 0),
    ("Bananas", 1),
    ("Washed Potatoes", 1),
    ("Chicken Fillet", 2),
    ("Stewed Beef", 2),
    ("Makfa Pasta", 3),
    ("Buckwheat", 3),
];

const BASE_PRICE_MIN: u32 = 50;
const BASE_PRICE_MAX: u32 = 500;
const DAILY_JITTER: i32 = 20;

/// Inputs of the generator. Same config, same dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub seed: u64,
    /// Days of history per product, ending at `today`.
    pub days: u32,
    pub today: NaiveDate,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Dataset, AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Sample days must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut dataset = Dataset::new();

    let categories: Vec<_> = CATEGORIES.iter().map(|name| dataset.ensure_category(name)).collect();
    let stores: Vec<_> = STORES.iter().map(|name| dataset.ensure_store(name)).collect();

    for (name, cat_idx) in PRODUCTS {
        let product = dataset.ensure_product(name, categories[cat_idx]);
        let base = rng.gen_range(BASE_PRICE_MIN..=BASE_PRICE_MAX) as i32;

        for day in 0..config.days {
            let date = config
                .today
                .checked_sub_days(Days::new(u64::from(day)))
                .ok_or_else(|| AppError::new(2, "Sample history reaches before the supported date range."))?;
            let price = base + rng.gen_range(-DAILY_JITTER..=DAILY_JITTER);
            let store = *stores
                .choose(&mut rng)
                .ok_or_else(|| AppError::new(4, "Sample store list is empty."))?;

            dataset
                .push_observation(product, store, date, f64::from(price))
                .ok_or_else(|| AppError::new(4, "Sample product missing from the catalog."))?;
        }
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            seed,
            days: 30,
            today: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let a = generate_sample(&config(42)).unwrap();
        let b = generate_sample(&config(42)).unwrap();
        assert_eq!(a.all_observations(), b.all_observations());
        let c = generate_sample(&config(7)).unwrap();
        assert_ne!(a.all_observations(), c.all_observations());
    }

    #[test]
    fn shape_matches_catalog() {
        let ds = generate_sample(&config(1)).unwrap();
        assert_eq!(ds.categories().len(), 4);
        assert_eq!(ds.stores().len(), 3);
        assert_eq!(ds.products().len(), 8);
        assert_eq!(ds.all_observations().len(), 8 * 30);

        let cfg = config(1);
        let earliest = cfg.today.checked_sub_days(Days::new(29)).unwrap();
        for obs in ds.all_observations() {
            assert!(obs.price >= 30.0 && obs.price <= 520.0);
            assert!(obs.date <= cfg.today && obs.date >= earliest);
        }
    }

    #[test]
    fn zero_days_is_rejected() {
        let mut cfg = config(1);
        cfg.days = 0;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);
    }
}
