//! # Catalog Store
//!
//! Durable read/write of the full product sequence under one storage key.
//! Reads never fail: missing, unreadable, or malformed data is treated as an
//! empty catalog. Writes overwrite the stored value unconditionally.

use super::product::Product;
use crate::state::KeyValueStorage;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Storage key holding the JSON array of products
pub const PRODUCTS_KEY: &str = "PRODUCTS";

/// Persistence port for the product sequence
pub trait CatalogStore: Send + Sync {
    /// Stored products in insertion order; empty when nothing usable is stored
    fn read(&self) -> Vec<Product>;

    /// Replace the stored sequence with `products`
    fn write(&self, products: &[Product]) -> Result<()>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    fn read(&self) -> Vec<Product> {
        (**self).read()
    }

    fn write(&self, products: &[Product]) -> Result<()> {
        (**self).write(products)
    }
}

/// [`CatalogStore`] over a [`KeyValueStorage`] backend
#[derive(Clone)]
pub struct LocalCatalogStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalCatalogStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    fn try_read(&self) -> Result<Vec<Product>> {
        let Some(raw) = self.storage.get_item(PRODUCTS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("Stored products are not a valid product list")
    }
}

impl CatalogStore for LocalCatalogStore {
    fn read(&self) -> Vec<Product> {
        match self.try_read() {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Loaded stored products");
                products
            }
            Err(e) => {
                tracing::warn!("Failed to load products, starting empty: {:#}", e);
                Vec::new()
            }
        }
    }

    fn write(&self, products: &[Product]) -> Result<()> {
        let json = serde_json::to_string(products).context("Failed to serialize products")?;
        self.storage.set_item(PRODUCTS_KEY, &json)?;
        tracing::debug!(count = products.len(), "Wrote products to storage");
        Ok(())
    }
}
