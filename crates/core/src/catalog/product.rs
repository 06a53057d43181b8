use serde::{Deserialize, Serialize};

/// Currency prefix shown on product cards
pub const CARD_CURRENCY_PREFIX: &str = "$";

/// Placeholder text shown in a card's image slot
pub const IMAGE_PLACEHOLDER: &str = "Product image...";

/// Category badges shown on every card; not derived from product data
pub const CATEGORY_BADGES: [&str; 3] = ["Beverage", "Food", "Produce"];

/// A catalog product as stored under the `PRODUCTS` key.
///
/// Every field is free text. Stock and price are never parsed as numbers,
/// and `product_image` is an opaque placeholder rather than image data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_name: String,
    pub number_in_stock: String,
    pub price: String,
    pub product_image: String,
}

impl Product {
    pub fn new(
        product_name: impl Into<String>,
        number_in_stock: impl Into<String>,
        price: impl Into<String>,
        product_image: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            number_in_stock: number_in_stock.into(),
            price: price.into(),
            product_image: product_image.into(),
        }
    }
}

/// One rendered grid card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    /// Stable render key of the backing catalog entry
    pub key: u64,
    pub image_placeholder: &'static str,
    pub badges: [&'static str; 3],
    pub name: String,
    /// Price with the card currency prefix, e.g. `$25`
    pub price_label: String,
    /// e.g. `Item in stock: 10`
    pub stock_label: String,
}

impl ProductCard {
    pub fn new(key: u64, product: &Product) -> Self {
        Self {
            key,
            image_placeholder: IMAGE_PLACEHOLDER,
            badges: CATEGORY_BADGES,
            name: product.product_name.clone(),
            price_label: format!("{}{}", CARD_CURRENCY_PREFIX, product.price),
            stock_label: format!("Item in stock: {}", product.number_in_stock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_uses_camel_case_keys() {
        let product = Product::new("Soda", "10", "25", "");
        let json = serde_json::to_string(&product).unwrap();
        assert_eq!(
            json,
            r#"{"productName":"Soda","numberInStock":"10","price":"25","productImage":""}"#
        );
    }

    #[test]
    fn test_product_rejects_missing_fields() {
        let result = serde_json::from_str::<Product>(r#"{"productName":"Soda"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_card_labels() {
        let card = ProductCard::new(7, &Product::new("Soda", "10", "25", "soda.png"));
        assert_eq!(card.key, 7);
        assert_eq!(card.name, "Soda");
        assert_eq!(card.price_label, "$25");
        assert_eq!(card.stock_label, "Item in stock: 10");
        assert_eq!(card.image_placeholder, "Product image...");
        assert_eq!(card.badges, ["Beverage", "Food", "Produce"]);
    }
}
