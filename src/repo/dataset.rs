//! In-memory catalog + observation store.
//!
//! `Dataset` is what the CSV loader and the sample generator produce, and what
//! the CLI hands to the engines through `ObservationRepository`.
//!
//! Identifiers are 1-based positions in insertion order, so a given file
//! always loads to the same ids.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{
    slugify, Category, CategoryId, ObservationId, PriceObservation, Product, ProductId, Store, StoreId,
};
use crate::repo::{filter_sorted, ObservationFilter, ObservationRepository};

type ObservationKey = (ProductId, StoreId, NaiveDate);

/// What an upsert did to the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    categories: Vec<Category>,
    products: Vec<Product>,
    stores: Vec<Store>,
    observations: Vec<PriceObservation>,
    by_key: HashMap<ObservationKey, Vec<usize>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn all_observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(index_of(id.0)?)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(index_of(id.0)?)
    }

    pub fn store(&self, id: StoreId) -> Option<&Store> {
        self.stores.get(index_of(id.0)?)
    }

    /// Case-insensitive lookup by category name or slug.
    pub fn find_category(&self, name: &str) -> Option<&Category> {
        let slug = slugify(name);
        self.categories
            .iter()
            .find(|c| same_name(&c.name, name) || c.slug == slug)
    }

    /// Every product called `name` (case-insensitive), one per category.
    pub fn find_products(&self, name: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| same_name(&p.name, name)).collect()
    }

    pub fn find_store(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|s| same_name(&s.name, name))
    }

    /// Category id for `name`, creating the category if needed.
    ///
    /// Names that differ only in case or spacing share one category (and one slug).
    pub fn ensure_category(&mut self, name: &str) -> CategoryId {
        let name = name.trim();
        if let Some(c) = self.find_category(name) {
            return c.id;
        }
        let id = CategoryId(next_id(self.categories.len()));
        self.categories.push(Category {
            id,
            name: name.to_string(),
            slug: slugify(name),
        });
        id
    }

    pub fn ensure_store(&mut self, name: &str) -> StoreId {
        let name = name.trim();
        if let Some(s) = self.find_store(name) {
            return s.id;
        }
        let id = StoreId(next_id(self.stores.len()));
        self.stores.push(Store {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Product id for the natural key `(name, category)`, creating it if needed.
    pub fn ensure_product(&mut self, name: &str, category_id: CategoryId) -> ProductId {
        let name = name.trim();
        if let Some(p) = self
            .products
            .iter()
            .find(|p| p.category_id == category_id && same_name(&p.name, name))
        {
            return p.id;
        }
        let id = ProductId(next_id(self.products.len()));
        self.products.push(Product {
            id,
            name: name.to_string(),
            category_id,
        });
        id
    }

    /// Append an observation as-is, even if its `(product, store, date)` key
    /// already exists.
    ///
    /// Returns `None` (and stores nothing) when `product_id` is not in the catalog.
    pub fn push_observation(
        &mut self,
        product_id: ProductId,
        store_id: StoreId,
        date: NaiveDate,
        price: f64,
    ) -> Option<ObservationId> {
        let category_id = self.product(product_id)?.category_id;
        let id = ObservationId(next_id(self.observations.len()));
        self.by_key
            .entry((product_id, store_id, date))
            .or_default()
            .push(self.observations.len());
        self.observations.push(PriceObservation {
            id,
            product_id,
            store_id,
            category_id,
            date,
            price,
        });
        Some(id)
    }

    /// Insert or replace the price for `(product, store, date)`.
    ///
    /// When upstream duplicates already exist for the key, all of them take
    /// the new price; no further duplicate is created.
    pub fn upsert_observation(
        &mut self,
        product_id: ProductId,
        store_id: StoreId,
        date: NaiveDate,
        price: f64,
    ) -> Option<UpsertOutcome> {
        if let Some(indices) = self.by_key.get(&(product_id, store_id, date)) {
            for &idx in indices {
                self.observations[idx].price = price;
            }
            return Some(UpsertOutcome::Updated);
        }
        self.push_observation(product_id, store_id, date, price)?;
        Some(UpsertOutcome::Created)
    }

    /// Every observation of a product, newest first.
    pub fn product_history(&self, product_id: ProductId) -> Vec<PriceObservation> {
        let mut history = filter_sorted(
            &self.observations,
            &ObservationFilter::default().with_product(Some(product_id)),
        );
        history.reverse();
        history
    }
}

impl ObservationRepository for Dataset {
    fn observations(&self, filter: &ObservationFilter) -> Vec<PriceObservation> {
        filter_sorted(&self.observations, filter)
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len + 1).unwrap_or(u32::MAX)
}

fn index_of(id: u32) -> Option<usize> {
    (id as usize).checked_sub(1)
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn catalog_entries_are_reused_by_natural_key() {
        let mut ds = Dataset::new();
        let dairy = ds.ensure_category("Dairy");
        let bakery = ds.ensure_category("Bakery");
        assert_eq!(ds.ensure_category("Dairy"), dairy);

        let milk = ds.ensure_product("Milk", dairy);
        assert_eq!(ds.ensure_product("Milk", dairy), milk);
        // Same name in another category is a different product.
        assert_ne!(ds.ensure_product("Milk", bakery), milk);

        assert_eq!(ds.ensure_store("Magnit"), ds.ensure_store(" Magnit "));
        assert_eq!(ds.categories()[0].slug, "dairy");
    }

    #[test]
    fn upsert_replaces_instead_of_duplicating() {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Dairy");
        let milk = ds.ensure_product("Milk", cat);
        let store = ds.ensure_store("Magnit");

        assert_eq!(ds.upsert_observation(milk, store, d(1), 80.0), Some(UpsertOutcome::Created));
        assert_eq!(ds.upsert_observation(milk, store, d(1), 85.0), Some(UpsertOutcome::Updated));
        assert_eq!(ds.all_observations().len(), 1);
        assert_eq!(ds.all_observations()[0].price, 85.0);
        assert_eq!(ds.all_observations()[0].category_id, cat);
    }

    #[test]
    fn push_keeps_duplicates() {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Dairy");
        let milk = ds.ensure_product("Milk", cat);
        let store = ds.ensure_store("Magnit");
        let a = ds.push_observation(milk, store, d(1), 80.0).unwrap();
        let b = ds.push_observation(milk, store, d(1), 81.0).unwrap();
        assert!(b > a);
        assert_eq!(ds.all_observations().len(), 2);
    }

    #[test]
    fn history_is_newest_first() {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Dairy");
        let milk = ds.ensure_product("Milk", cat);
        let store = ds.ensure_store("Magnit");
        ds.push_observation(milk, store, d(2), 1.0);
        ds.push_observation(milk, store, d(5), 2.0);
        ds.push_observation(milk, store, d(3), 3.0);

        let dates: Vec<NaiveDate> = ds.product_history(milk).iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(5), d(3), d(2)]);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let mut ds = Dataset::new();
        let cat = ds.ensure_category("Meat and Poultry");
        ds.ensure_product("Chicken Fillet", cat);
        assert!(ds.find_category("meat-and-poultry").is_some());
        assert_eq!(ds.find_products("chicken fillet").len(), 1);
        assert!(ds.find_store("nowhere").is_none());
    }

    #[test]
    fn case_variants_share_one_catalog_entry() {
        let mut ds = Dataset::new();
        let dairy = ds.ensure_category("Dairy");
        assert_eq!(ds.ensure_category("dairy"), dairy);
        assert_eq!(ds.ensure_category("DAIRY "), dairy);
        assert_eq!(ds.categories().len(), 1);

        let magnit = ds.ensure_store("Magnit");
        assert_eq!(ds.ensure_store("magnit"), magnit);
        assert_eq!(ds.stores().len(), 1);

        let milk = ds.ensure_product("Milk", dairy);
        assert_eq!(ds.ensure_product("MILK", dairy), milk);
        assert_eq!(ds.products().len(), 1);
    }

    #[test]
    fn same_product_name_in_two_categories_is_listed_twice() {
        let mut ds = Dataset::new();
        let dairy = ds.ensure_category("Dairy");
        let vegan = ds.ensure_category("Vegan");
        ds.ensure_product("Milk", dairy);
        ds.ensure_product("Milk", vegan);
        let categories: Vec<CategoryId> = ds.find_products("milk").iter().map(|p| p.category_id).collect();
        assert_eq!(categories, vec![dairy, vegan]);
    }

    #[test]
    fn unknown_product_id_is_rejected_without_panicking() {
        let mut ds = Dataset::new();
        let store = ds.ensure_store("Magnit");
        assert_eq!(ds.push_observation(ProductId(0), store, d(1), 1.0), None);
        assert_eq!(ds.push_observation(ProductId(7), store, d(1), 1.0), None);
        assert_eq!(ds.upsert_observation(ProductId(7), store, d(1), 1.0), None);
        assert!(ds.is_empty());
    }
}
