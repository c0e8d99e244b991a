//! # Cart Types and Pricing Engine
//!
//! Cart line items, the cart itself, and the pure totals computation.
//! All price-affecting mutations must go through `Totals::compute` so
//! that a future pricing change (tax, shipping) has one point of
//! modification.

use crate::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line item in the cart.
///
/// Identified independently of the product it wraps: the same product
/// with two different delivery dates is two distinct lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Unique line id (generated, not the product id)
    pub id: String,

    /// Catalog product id
    pub product_id: String,

    /// Product snapshot (denormalized for display and receipts)
    pub product: Product,

    /// Quantity, always >= 1 (dropping below 1 deletes the line)
    pub quantity: u32,

    /// Per-line delivery date, if scheduled individually
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,

    /// Freeform note for the florist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl CartLineItem {
    /// Create a line item from a product snapshot
    pub fn new(
        product: &Product,
        quantity: u32,
        delivery_date: Option<DateTime<Utc>>,
        special_instructions: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product: product.clone(),
            quantity: quantity.max(1),
            delivery_date,
            special_instructions,
        }
    }

    /// Price for this line in euros
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }

    /// Whether this line merges with an add of the same product.
    /// Delivery dates compare by exact instant; None only matches None.
    pub fn merges_with(&self, product_id: &str, delivery_date: Option<DateTime<Utc>>) -> bool {
        self.product_id == product_id && self.delivery_date == delivery_date
    }
}

/// Computed cart totals, all in euros
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping_cost: f64,
    pub total: f64,
}

impl Totals {
    /// The pricing engine. Pure and deterministic, no I/O.
    ///
    /// Prices are tax-inclusive and delivery is free, so tax and
    /// shipping are currently always zero; they remain computed fields
    /// rather than constants at call sites. The total is clamped at
    /// zero so a discount larger than the subtotal can never produce
    /// a negative charge.
    pub fn compute(items: &[CartLineItem], discount_amount: f64) -> Self {
        let subtotal: f64 = items.iter().map(CartLineItem::line_total).sum();
        let tax = 0.0;
        let shipping_cost = 0.0;
        let total = (subtotal + tax + shipping_cost - discount_amount).max(0.0);

        Self {
            subtotal,
            tax,
            shipping_cost,
            total,
        }
    }
}

/// The shopping cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Ordered line items
    pub items: Vec<CartLineItem>,

    pub subtotal: f64,
    pub tax: f64,
    pub shipping_cost: f64,
    pub total: f64,

    /// Discount from an applied coupon, in euros
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,

    /// The applied coupon code, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

impl Cart {
    /// Create an empty cart with zeroed totals
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: 0.0,
            tax: 0.0,
            shipping_cost: 0.0,
            total: 0.0,
            discount_amount: None,
            coupon_code: None,
        }
    }

    /// Effective discount (0.0 when no coupon is applied)
    pub fn discount(&self) -> f64 {
        self.discount_amount.unwrap_or(0.0)
    }

    /// Recompute totals from the current items and discount.
    /// Must be called after every price-affecting mutation.
    pub fn recompute(&mut self) {
        let totals = Totals::compute(&self.items, self.discount());
        self.subtotal = totals.subtotal;
        self.tax = totals.tax;
        self.shipping_cost = totals.shipping_cost;
        self.total = totals.total;
    }

    /// Check if the cart has no line items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines
    pub fn total_item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Find a line by its id
    pub fn line(&self, line_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == line_id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}
