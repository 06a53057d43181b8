//! # Catalog View
//!
//! Owns the in-memory product sequence for the lifetime of a page session and
//! mirrors every addition to the [`CatalogStore`].
//!
//! The sequence is shared as an `Arc<[CatalogEntry]>`. Adding a product builds
//! a new sequence and swaps it in, so snapshots handed out earlier keep the
//! contents they were taken with.

use super::product::{Product, ProductCard};
use super::store::CatalogStore;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

/// Render key of a catalog entry, assigned once when the entry enters the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryKey(pub u64);

/// A product paired with its render key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: EntryKey,
    pub product: Product,
}

pub struct CatalogView<S> {
    store: S,
    entries: Arc<[CatalogEntry]>,
    next_key: u64,
}

impl<S: CatalogStore> CatalogView<S> {
    /// Populate the view from whatever the store currently holds
    pub fn load(store: S) -> Self {
        let entries: Arc<[CatalogEntry]> = store
            .read()
            .into_iter()
            .enumerate()
            .map(|(i, product)| CatalogEntry {
                key: EntryKey(i as u64),
                product,
            })
            .collect();
        let next_key = entries.len() as u64;

        Self {
            store,
            entries,
            next_key,
        }
    }

    fn allocate_key(&mut self) -> EntryKey {
        let key = EntryKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Append `product` and write the full sequence through to the store.
    ///
    /// The in-memory sequence is updated before the write, so a failed write
    /// still leaves the product visible for this session.
    pub fn add_product(&mut self, product: Product) -> Result<EntryKey> {
        let key = self.allocate_key();
        let entry = CatalogEntry { key, product };

        let entries: Arc<[CatalogEntry]> = self
            .entries
            .iter()
            .cloned()
            .chain(std::iter::once(entry))
            .collect();
        self.entries = entries;

        self.store.write(&self.products())?;
        Ok(key)
    }

    /// Current sequence; unaffected by later additions
    pub fn snapshot(&self) -> Arc<[CatalogEntry]> {
        Arc::clone(&self.entries)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn products(&self) -> Vec<Product> {
        self.entries.iter().map(|e| e.product.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One card per entry, in insertion order
    pub fn render(&self) -> Vec<ProductCard> {
        self.entries
            .iter()
            .map(|e| ProductCard::new(e.key.0, &e.product))
            .collect()
    }
}
