//! # Backend Configuration
//!
//! Configuration for the storefront backend API: payment-intent
//! creation, coupon validation, delivery zones, and receipt dispatch
//! all live behind the same base URL.

use bloom_core::{CheckoutError, CART_STORAGE_KEY};
use std::env;

/// Per-call timeout for backend API requests
pub const BACKEND_TIMEOUT_SECS: u64 = 10;

/// Storefront backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend API, without a trailing slash
    pub base_url: String,

    /// Storage key the cart snapshot is persisted under
    pub storage_key: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `BACKEND_URL` (default `http://localhost:8080/api`)
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api".to_string());

        if base_url.trim().is_empty() {
            return Err(CheckoutError::Configuration(
                "BACKEND_URL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            storage_key: CART_STORAGE_KEY.to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            storage_key: CART_STORAGE_KEY.to_string(),
        }
    }

    /// Builder: set the storage key (for test isolation)
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}
