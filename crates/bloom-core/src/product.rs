//! # Product Types
//!
//! Read-only product snapshot carried by cart line items.
//! The catalog itself lives behind the shop API; this core only
//! embeds what it was handed when the item was added.

use serde::{Deserialize, Serialize};

/// Currency code sent to the payment backend. Prices in this shop are
/// tax-inclusive euros; there is no multi-currency support.
pub const CURRENCY: &str = "eur";

/// Convert a decimal euro amount to cents for the payment boundary.
///
/// Internal prices stay floating-point euros; this conversion happens
/// exactly once, when an amount is handed to the payment protocol.
pub fn eur_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert cents back to decimal euros
pub fn cents_to_eur(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format a euro amount for display (e.g. "35.90€")
pub fn format_eur(amount: f64) -> String {
    format!("{:.2}€", amount)
}

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A product as handed to the cart by the catalog layer.
///
/// Snapshot semantics: once embedded in a line item the price and name
/// are frozen for that cart session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Unit price in euros, tax-inclusive
    pub price: f64,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Category
    pub category: ProductCategory,

    /// Whether the product is currently purchasable
    #[serde(default = "default_true")]
    pub in_stock: bool,

    /// Remaining stock, informational only for this core
    #[serde(default)]
    pub stock_quantity: u32,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a product snapshot with the fields this core cares about
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            images: Vec::new(),
            category: ProductCategory {
                id: "bouquets".to_string(),
                name: "Bouquets".to_string(),
                slug: "bouquets".to_string(),
            },
            in_stock: true,
            stock_quantity: 0,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set category
    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = category;
        self
    }

    /// Builder: set stock state
    pub fn with_stock(mut self, in_stock: bool, quantity: u32) -> Self {
        self.in_stock = in_stock;
        self.stock_quantity = quantity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eur_cents_conversion() {
        assert_eq!(eur_to_cents(35.90), 3590);
        assert_eq!(eur_to_cents(0.50), 50);
        assert_eq!(eur_to_cents(71.80), 7180);
        assert_eq!(cents_to_eur(3590), 35.90);
    }

    #[test]
    fn test_rounding_at_the_boundary() {
        // 29.99 * 100 is 2998.9999... in binary floating point
        assert_eq!(eur_to_cents(29.99), 2999);
        assert_eq!(eur_to_cents(0.1 + 0.2), 30);
    }

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(35.9), "35.90€");
        assert_eq!(format_eur(0.0), "0.00€");
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new("rose-eternelle", "Rose Éternelle", 24.90)
            .with_description("Une rose stabilisée sous cloche")
            .with_stock(true, 12);

        assert_eq!(product.id, "rose-eternelle");
        assert_eq!(product.price, 24.90);
        assert!(product.in_stock);
        assert_eq!(product.stock_quantity, 12);
    }
}
