//! # Coupon Validation
//!
//! Remote coupon validation. The backend is the only authority on
//! coupon codes; the cart store applies the outcome atomically so the
//! displayed discount can never disagree with the applied code.

use crate::config::{BackendConfig, BACKEND_TIMEOUT_SECS};
use async_trait::async_trait;
use bloom_core::{CheckoutError, CheckoutResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of validating a coupon code
#[derive(Debug, Clone, PartialEq)]
pub enum CouponOutcome {
    /// The code is valid and grants a flat discount in euros
    Accepted { discount_amount: f64 },
    /// The code is unknown, expired, or otherwise not applicable.
    /// Not an error: the cart stays as it was.
    Rejected,
}

/// Remote authority on coupon codes
#[async_trait]
pub trait CouponValidator: Send + Sync {
    async fn validate(&self, code: &str) -> CheckoutResult<CouponOutcome>;
}

/// Type alias for a shared validator (dynamic dispatch)
pub type BoxedCouponValidator = Arc<dyn CouponValidator>;

#[derive(Debug, Serialize)]
struct ValidateCouponRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateCouponResponse {
    valid: bool,
    #[serde(default)]
    discount_amount: Option<f64>,
}

/// HTTP implementation backed by the storefront backend
pub struct HttpCouponClient {
    config: BackendConfig,
    client: Client,
}

impl HttpCouponClient {
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl CouponValidator for HttpCouponClient {
    #[instrument(skip(self))]
    async fn validate(&self, code: &str) -> CheckoutResult<CouponOutcome> {
        let url = format!("{}/coupons/validate", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ValidateCouponRequest { code })
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ValidateCouponResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;

        if !parsed.valid {
            debug!("Coupon rejected: code={}", code);
            return Ok(CouponOutcome::Rejected);
        }

        // A valid coupon must carry a usable discount
        match parsed.discount_amount {
            Some(amount) if amount >= 0.0 => {
                debug!("Coupon accepted: code={}, discount={}", code, amount);
                Ok(CouponOutcome::Accepted {
                    discount_amount: amount,
                })
            }
            _ => Err(CheckoutError::Backend {
                status: status.as_u16(),
                message: "valid coupon without a usable discount amount".to_string(),
            }),
        }
    }
}
