//! # Payment Backend Client
//!
//! Client for the backend endpoint that creates and funds payment
//! intents with the processor's secret key. This core never sees that
//! key; it receives a client secret back and hands it to the processor
//! for confirmation.

use crate::config::{BackendConfig, BACKEND_TIMEOUT_SECS};
use async_trait::async_trait;
use bloom_core::{CheckoutError, CheckoutResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Request to create a payment intent.
/// Amounts are integer cents; euros never cross this boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    /// Amount to charge, in cents
    pub amount: i64,
    /// ISO currency code (lowercase)
    pub currency: String,
    pub description: String,
    /// Client-generated order id
    pub order_id: String,
    /// Tokenized payment method to attach
    pub payment_method_id: String,
    /// Email the processor sends its receipt to
    pub receipt_email: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// A created payment intent as returned by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub id: String,
    /// Secret the client uses to confirm the intent. Absence is a
    /// backend fault, surfaced as `MissingClientSecret` by the caller.
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Backend contract for the intent phase of a payment
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    /// Create a payment intent. `idempotency_key` dedupes retries of
    /// the same attempt on the backend side.
    async fn create_intent(
        &self,
        request: &CreateIntentRequest,
        idempotency_key: &str,
    ) -> CheckoutResult<CreateIntentResponse>;
}

/// Type alias for a shared backend (dynamic dispatch)
pub type BoxedPaymentBackend = Arc<dyn PaymentBackend>;

/// HTTP implementation backed by the storefront backend
pub struct HttpPaymentBackend {
    config: BackendConfig,
    client: Client,
}

impl HttpPaymentBackend {
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl PaymentBackend for HttpPaymentBackend {
    #[instrument(skip(self, request), fields(order_id = %request.order_id, amount = request.amount))]
    async fn create_intent(
        &self,
        request: &CreateIntentRequest,
        idempotency_key: &str,
    ) -> CheckoutResult<CreateIntentResponse> {
        let url = format!("{}/payment/create-intent", self.config.base_url);

        debug!("Creating payment intent");

        let response = self
            .client
            .post(&url)
            .header("Idempotency-Key", idempotency_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Intent creation failed: status={}", status);
            return Err(CheckoutError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CreateIntentResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;

        info!(
            "Payment intent created: id={}, status={}",
            parsed.id, parsed.status
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CreateIntentRequest {
        CreateIntentRequest {
            amount: 7180,
            currency: "eur".to_string(),
            description: "Commande ORDER_1".to_string(),
            order_id: "ORDER_1".to_string(),
            payment_method_id: "pm_123".to_string(),
            receipt_email: "marie@example.fr".to_string(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_request_wire_shape_is_camel_case() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["amount"], 7180);
        assert_eq!(json["orderId"], "ORDER_1");
        assert_eq!(json["paymentMethodId"], "pm_123");
        assert_eq!(json["receiptEmail"], "marie@example.fr");
        // Empty metadata is omitted entirely
        assert!(json.get("metadata").is_none());
    }

    #[tokio::test]
    async fn test_create_intent_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create-intent"))
            .and(header("Idempotency-Key", "idem-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_3ABC",
                "clientSecret": "pi_3ABC_secret_xyz",
                "amount": 7180,
                "currency": "eur",
                "status": "requires_confirmation",
                "orderId": "ORDER_1"
            })))
            .mount(&server)
            .await;

        let backend = HttpPaymentBackend::new(BackendConfig::new(server.uri()));
        let response = backend.create_intent(&request(), "idem-1").await.unwrap();

        assert_eq!(response.id, "pi_3ABC");
        assert_eq!(response.client_secret.as_deref(), Some("pi_3ABC_secret_xyz"));
        assert_eq!(response.amount, 7180);
    }

    #[tokio::test]
    async fn test_missing_client_secret_still_parses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create-intent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_3ABC",
                "amount": 7180,
                "currency": "eur",
                "status": "requires_payment_method"
            })))
            .mount(&server)
            .await;

        let backend = HttpPaymentBackend::new(BackendConfig::new(server.uri()));
        let response = backend.create_intent(&request(), "idem-1").await.unwrap();

        // The orchestrator turns this into MissingClientSecret
        assert!(response.client_secret.is_none());
    }

    #[tokio::test]
    async fn test_backend_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/create-intent"))
            .respond_with(ResponseTemplate::new(400).set_body_string("amount too small"))
            .mount(&server)
            .await;

        let backend = HttpPaymentBackend::new(BackendConfig::new(server.uri()));
        let err = backend.create_intent(&request(), "idem-1").await.unwrap_err();

        assert!(matches!(err, CheckoutError::Backend { status: 400, .. }));
    }
}
