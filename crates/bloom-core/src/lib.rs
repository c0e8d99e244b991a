//! # bloom-core
//!
//! Core types and checkout state machine for the bloom-cart storefront
//! engine.
//!
//! This crate provides:
//! - `Cart`, `CartLineItem`, and the pure `Totals` pricing engine
//! - `DeliveryZone`, `TimeSlot`, `DeliveryInfo`/`BillingInfo` with
//!   field validation
//! - `CheckoutFlow` step machine (delivery → payment → confirmation)
//! - `PaymentProcessor` trait for payment-processor SDK implementations
//! - `CartStorage` trait and the persisted-cart JSON schema
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bloom_core::{Cart, CartLineItem, CheckoutFlow, Product, Totals};
//!
//! // Build a cart
//! let mut cart = Cart::empty();
//! cart.items.push(CartLineItem::new(&product, 2, None, None));
//! cart.recompute();
//!
//! // Enter checkout (preconditions: items, zone, date)
//! let mut flow = CheckoutFlow::begin(&cart, Some(&zone), Some(date))?;
//! flow.submit_delivery(delivery_info, None, true)?;
//!
//! // The payment orchestrator in bloom-checkout drives the rest.
//! ```

pub mod cart;
pub mod checkout;
pub mod delivery;
pub mod error;
pub mod processor;
pub mod product;
pub mod storage;

// Re-exports for convenience
pub use cart::{Cart, CartLineItem, Totals};
pub use checkout::{CheckoutFlow, CheckoutStep, Confirmation};
pub use delivery::{
    BillingInfo, DeliveryInfo, DeliveryZone, FieldError, TimeSlot, ValidationErrors,
};
pub use error::{CheckoutError, CheckoutResult, Precondition};
pub use processor::{
    BillingDetails, BoxedPaymentProcessor, CardDetails, IntentStatus, PaymentConfirmation,
    PaymentMethod, PaymentProcessor,
};
pub use product::{cents_to_eur, eur_to_cents, format_eur, Product, ProductCategory, CURRENCY};
pub use storage::{CartStorage, MemoryStorage, PersistedCart, CART_STORAGE_KEY};
