//! # Catalog
//!
//! The products page: records, the add-product form, the in-memory view and
//! the store it mirrors to.
//!
//! ```text
//! AddProductForm --submit--> SubmitHandler --toast--> Notifier
//!                                  |
//!                                  v
//!                            CatalogView --write--> CatalogStore --> KeyValueStorage
//! ```

pub mod form;
pub mod notification;
pub mod page;
pub mod product;
pub mod store;
pub mod view;

pub use form::{
    AddProductForm, FieldIssue, FormField, FormState, InputType, ShapeErrors, ShapeIssue,
    SubmitError, SubmitHandler,
};
pub use notification::{Notifier, Toast, ToastQueue, TracingNotifier};
pub use page::{ProductsPage, Submission};
pub use product::{Product, ProductCard, CARD_CURRENCY_PREFIX, CATEGORY_BADGES, IMAGE_PLACEHOLDER};
pub use store::{CatalogStore, LocalCatalogStore, PRODUCTS_KEY};
pub use view::{CatalogEntry, CatalogView, EntryKey};
