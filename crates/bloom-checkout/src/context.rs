//! # Checkout Context
//!
//! Wires the concrete clients into one ready-to-use checkout core:
//! the persisted cart store, the coupon validator, the zone directory,
//! and the payment orchestrator backed by Stripe.

use crate::backend::HttpPaymentBackend;
use crate::cart_store::CartStore;
use crate::config::BackendConfig;
use crate::coupon::{BoxedCouponValidator, HttpCouponClient};
use crate::orchestrator::PaymentOrchestrator;
use crate::receipt::HttpReceiptClient;
use crate::zones::HttpZoneClient;
use anyhow::Context;
use bloom_core::CartStorage;
use bloom_stripe::StripeElements;
use std::sync::Arc;
use tracing::info;

/// Fully wired checkout core
pub struct CheckoutContext {
    pub cart: CartStore,
    pub coupons: BoxedCouponValidator,
    pub zones: HttpZoneClient,
    pub orchestrator: PaymentOrchestrator,
}

impl CheckoutContext {
    /// Build the context from environment configuration, restoring the
    /// cart from the given storage.
    pub fn from_env(storage: Arc<dyn CartStorage>) -> anyhow::Result<Self> {
        let backend_config = BackendConfig::from_env().context("Failed to load backend config")?;
        let stripe = StripeElements::from_env().context("Failed to load Stripe config")?;

        info!(
            "Checkout core initialized: backend={}",
            backend_config.base_url
        );

        let cart = CartStore::load(storage, backend_config.storage_key.clone());
        let orchestrator = PaymentOrchestrator::new(
            Arc::new(stripe),
            Arc::new(HttpPaymentBackend::new(backend_config.clone())),
            Arc::new(HttpReceiptClient::new(backend_config.clone())),
        );

        Ok(Self {
            cart,
            coupons: Arc::new(HttpCouponClient::new(backend_config.clone())),
            zones: HttpZoneClient::new(backend_config),
            orchestrator,
        })
    }
}
