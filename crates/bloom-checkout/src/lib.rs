//! # bloom-checkout
//!
//! The orchestration layer of the bloom-cart checkout core: the
//! persistence-backed cart store, HTTP clients for the storefront
//! backend (coupons, payment intents, receipts, delivery zones), and
//! the payment orchestrator that drives the two-phase card flow.
//!
//! ## Payment flow
//!
//! ```rust,ignore
//! use bloom_checkout::CheckoutContext;
//! use bloom_core::{CheckoutFlow, MemoryStorage};
//! use std::sync::Arc;
//!
//! let mut ctx = CheckoutContext::from_env(Arc::new(MemoryStorage::new()))?;
//!
//! let mut flow = CheckoutFlow::begin(
//!     ctx.cart.cart(),
//!     ctx.cart.selected_zone(),
//!     ctx.cart.global_delivery_date(),
//! )?;
//! flow.submit_delivery(delivery_info, None, true)?;
//!
//! let outcome = ctx.orchestrator.pay(&mut flow, &mut ctx.cart, &card).await?;
//! println!("order {} paid", outcome.order_id);
//! ```

pub mod backend;
pub mod cart_store;
pub mod config;
pub mod context;
pub mod coupon;
pub mod orchestrator;
pub mod receipt;
pub mod zones;

// Re-exports for convenience
pub use backend::{
    BoxedPaymentBackend, CreateIntentRequest, CreateIntentResponse, HttpPaymentBackend,
    PaymentBackend,
};
pub use cart_store::CartStore;
pub use config::{BackendConfig, BACKEND_TIMEOUT_SECS};
pub use context::CheckoutContext;
pub use coupon::{BoxedCouponValidator, CouponOutcome, CouponValidator, HttpCouponClient};
pub use orchestrator::{PaymentOrchestrator, PaymentOutcome, MINIMUM_CHARGE_CENTS};
pub use receipt::{
    BoxedReceiptDispatcher, HttpReceiptClient, ReceiptDispatcher, ReceiptRequest, ReceiptResponse,
};
pub use zones::{fallback_zones, HttpZoneClient};
