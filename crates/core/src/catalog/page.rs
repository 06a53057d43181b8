//! # Products Page
//!
//! Ties the add-product form, the catalog view and a notifier together. An
//! accepted submission raises the "Item added" toast, appends the product to
//! the view (writing through to storage), and then resets the form.

use super::form::{AddProductForm, SubmitError, SubmitHandler};
use super::notification::{Notifier, Toast};
use super::product::{Product, ProductCard};
use super::store::CatalogStore;
use super::view::{CatalogView, EntryKey};
use serde::Serialize;
use serde_json::{Map, Value};

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub key: EntryKey,
    pub product: Product,
    pub toast: Toast,
}

pub struct ProductsPage<S, N> {
    form: AddProductForm,
    view: CatalogView<S>,
    notifier: N,
}

/// Submit handler that notifies, then adds to the view
struct AddToCatalog<'a, S, N> {
    view: &'a mut CatalogView<S>,
    notifier: &'a N,
    accepted: Option<(EntryKey, Toast)>,
}

impl<S: CatalogStore, N: Notifier> SubmitHandler for AddToCatalog<'_, S, N> {
    fn on_submit(&mut self, record: Product) -> anyhow::Result<()> {
        let toast = Toast::item_added(&record);
        self.notifier.notify(toast.clone());

        let key = self.view.add_product(record)?;
        self.accepted = Some((key, toast));
        Ok(())
    }
}

impl<S: CatalogStore, N: Notifier> ProductsPage<S, N> {
    /// Load the catalog from `store` and start with a fresh form
    pub fn open(store: S, notifier: N) -> Self {
        let view = CatalogView::load(store);
        tracing::info!(products = view.len(), "Products page opened");
        Self {
            form: AddProductForm::new(),
            view,
            notifier,
        }
    }

    pub fn form(&self) -> &AddProductForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AddProductForm {
        &mut self.form
    }

    pub fn view(&self) -> &CatalogView<S> {
        &self.view
    }

    pub fn cards(&self) -> Vec<ProductCard> {
        self.view.render()
    }

    /// Submit whatever the form currently holds
    pub fn submit(&mut self) -> Result<Submission, SubmitError> {
        let mut handler = AddToCatalog {
            view: &mut self.view,
            notifier: &self.notifier,
            accepted: None,
        };

        let product = match self.form.submit(&mut handler) {
            Ok(product) => product,
            Err(e) => {
                if let SubmitError::Shape(issues) = &e {
                    tracing::debug!(issues = issues.len(), "Submission rejected");
                }
                return Err(e);
            }
        };

        let (key, toast) = handler
            .accepted
            .ok_or_else(|| anyhow::anyhow!("Submission accepted without a catalog entry"))?;

        tracing::info!(
            key = key.0,
            name = %product.product_name,
            "Product added to catalog"
        );
        Ok(Submission {
            key,
            product,
            toast,
        })
    }

    /// Start from a fresh form, fill it from `input`, and submit
    pub fn submit_values(&mut self, input: &Map<String, Value>) -> Result<Submission, SubmitError> {
        self.form.clear();
        self.form.fill(input);
        self.submit()
    }
}
