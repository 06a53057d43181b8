//! # JustPOS Core
//!
//! Product catalog for the JustPOS point-of-sale prototype: the add-product
//! form, the in-memory catalog view, and the local storage it mirrors to.
//!
//! ## Architecture
//!
//! - `catalog/` - Product records, form, view, store and the products page
//! - `state/` - Key/value storage backends and the `.justpos` runtime directory
//! - `config` - Persisted settings with environment overrides
//!
//! ## Usage
//!
//! ```rust,ignore
//! use justpos_core::catalog::{LocalCatalogStore, ProductsPage, TracingNotifier};
//! use justpos_core::config::JustposConfig;
//!
//! let config = JustposConfig::load().await;
//! let store = LocalCatalogStore::new(config.open_storage()?);
//! let mut page = ProductsPage::open(store, TracingNotifier);
//! let submission = page.submit_values(&input)?;
//! ```

pub mod catalog;
pub mod config;
pub mod state;
