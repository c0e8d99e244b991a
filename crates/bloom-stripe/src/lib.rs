//! # bloom-stripe
//!
//! Stripe implementation of the `PaymentProcessor` seam from
//! `bloom-core`: card tokenization and payment-intent confirmation
//! against the Stripe API, using only the publishable key. Creating
//! and funding the intent stays on the backend, which holds the
//! secret key.

pub mod config;
pub mod elements;

pub use config::{StripeConfig, STRIPE_TIMEOUT_SECS};
pub use elements::StripeElements;
