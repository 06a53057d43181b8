//! # Add-Product Form
//!
//! Collects the four product fields, checks their shape, and hands accepted
//! records to a [`SubmitHandler`].
//!
//! Shape validation only checks that each field is present as a string.
//! Empty names, negative stock, or a price of `"abc"` are all accepted.
//!
//! ```text
//! Editing --submit(ok)--> Submitted --handler ok--> reset --> Editing
//!    ^  \--submit(shape issues)--> Editing (issues kept per field)
//!    \------------------ handler error ----------------/ (values kept)
//! ```

use super::product::Product;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A form input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    ProductImage,
    ProductName,
    NumberInStock,
    Price,
}

/// HTML input type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    File,
    Text,
    Number,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Text => "text",
            Self::Number => "number",
        }
    }
}

impl FormField {
    /// Fields in display order
    pub const ALL: [FormField; 4] = [
        FormField::ProductImage,
        FormField::ProductName,
        FormField::NumberInStock,
        FormField::Price,
    ];

    /// Field key, matching the stored JSON property
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProductImage => "productImage",
            Self::ProductName => "productName",
            Self::NumberInStock => "numberInStock",
            Self::Price => "price",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProductImage => "Product image",
            Self::ProductName => "Product name",
            Self::NumberInStock => "Number in stock",
            Self::Price => "Item price",
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::ProductImage => None,
            Self::ProductName => Some("product name"),
            Self::NumberInStock => Some("stock number"),
            Self::Price => Some("Item price"),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ProductImage => "Item preview image",
            Self::ProductName => "This name will be shown as the item label",
            Self::NumberInStock => "Number available in stock",
            Self::Price => "Item price",
        }
    }

    pub fn input_type(&self) -> InputType {
        match self {
            Self::ProductImage => InputType::File,
            Self::ProductName => InputType::Text,
            Self::NumberInStock | Self::Price => InputType::Number,
        }
    }

    /// Whether the rendered input carries the `required` attribute.
    /// The shape check requires all four fields regardless.
    pub fn required_attr(&self) -> bool {
        !matches!(self, Self::ProductImage)
    }
}

/// Why a field failed shape validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeIssue {
    #[error("Required")]
    Required,
    #[error("Expected string, received {received}")]
    InvalidType { received: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: FormField,
    #[serde(rename = "message", serialize_with = "serialize_issue")]
    pub issue: ShapeIssue,
}

fn serialize_issue<S: serde::Serializer>(issue: &ShapeIssue, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(issue)
}

/// Per-field shape validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("{} field(s) failed shape validation", .0.len())]
#[serde(transparent)]
pub struct ShapeErrors(pub Vec<FieldIssue>);

impl ShapeErrors {
    pub fn for_field(&self, field: FormField) -> Option<&ShapeIssue> {
        self.0.iter().find(|i| i.field == field).map(|i| &i.issue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldIssue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Shape(#[from] ShapeErrors),
    #[error(transparent)]
    Rejected(#[from] anyhow::Error),
}

/// Receives each accepted record
pub trait SubmitHandler {
    fn on_submit(&mut self, record: Product) -> anyhow::Result<()>;
}

impl<F> SubmitHandler for F
where
    F: FnMut(Product) -> anyhow::Result<()>,
{
    fn on_submit(&mut self, record: Product) -> anyhow::Result<()> {
        self(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    #[default]
    Editing,
    Submitted,
}

/// Name given to a JSON value's type in shape issues
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
pub struct AddProductForm {
    values: HashMap<FormField, Value>,
    state: FormState,
    issues: Option<ShapeErrors>,
}

impl Default for AddProductForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddProductForm {
    /// Fresh form; only the image field has a default value
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(FormField::ProductImage, Value::String(String::new()));
        Self {
            values,
            state: FormState::Editing,
            issues: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn set(&mut self, field: FormField, value: impl Into<Value>) {
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: FormField) -> Option<&Value> {
        self.values.get(&field)
    }

    /// The field's value if it currently holds a string
    pub fn text(&self, field: FormField) -> Option<&str> {
        self.values.get(&field).and_then(Value::as_str)
    }

    /// Set every recognised key of `input`; unknown keys are ignored
    pub fn fill(&mut self, input: &Map<String, Value>) {
        for (name, value) in input {
            if let Some(field) = FormField::from_name(name) {
                self.values.insert(field, value.clone());
            }
        }
    }

    /// Issues from the last rejected submission, shown next to each field
    pub fn issues(&self) -> Option<&ShapeErrors> {
        self.issues.as_ref()
    }

    /// Back to defaults: no values, only the image default
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Set all four fields to empty strings
    pub fn reset(&mut self) {
        for field in FormField::ALL {
            self.values.insert(field, Value::String(String::new()));
        }
        self.issues = None;
        self.state = FormState::Editing;
    }

    /// Check that every field is present as a string
    pub fn validate(&self) -> Result<Product, ShapeErrors> {
        let mut issues = Vec::new();
        let mut take = |field: FormField| -> String {
            match self.values.get(&field) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => {
                    issues.push(FieldIssue {
                        field,
                        issue: ShapeIssue::InvalidType {
                            received: value_kind(other),
                        },
                    });
                    String::new()
                }
                None => {
                    issues.push(FieldIssue {
                        field,
                        issue: ShapeIssue::Required,
                    });
                    String::new()
                }
            }
        };

        let product_image = take(FormField::ProductImage);
        let product_name = take(FormField::ProductName);
        let number_in_stock = take(FormField::NumberInStock);
        let price = take(FormField::Price);

        if issues.is_empty() {
            Ok(Product {
                product_name,
                number_in_stock,
                price,
                product_image,
            })
        } else {
            Err(ShapeErrors(issues))
        }
    }

    /// Validate and hand the record to `handler`, resetting on success
    pub fn submit<H>(&mut self, handler: &mut H) -> Result<Product, SubmitError>
    where
        H: SubmitHandler + ?Sized,
    {
        let product = match self.validate() {
            Ok(product) => product,
            Err(issues) => {
                self.issues = Some(issues.clone());
                return Err(issues.into());
            }
        };

        self.issues = None;
        self.state = FormState::Submitted;

        if let Err(e) = handler.on_submit(product.clone()) {
            self.state = FormState::Editing;
            return Err(e.into());
        }

        self.reset();
        Ok(product)
    }
}
