//! # Stripe Elements Client
//!
//! The client side of the Stripe card flow: tokenize card data into a
//! payment method, then confirm a payment intent with the client
//! secret issued by the backend. Mirrors what Stripe.js does in a
//! browser, authorized by the publishable key only.

use crate::config::{StripeConfig, STRIPE_TIMEOUT_SECS};
use async_trait::async_trait;
use bloom_core::{
    BillingDetails, CardDetails, CheckoutError, CheckoutResult, IntentStatus, PaymentConfirmation,
    PaymentMethod, PaymentProcessor,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe implementation of the `PaymentProcessor` seam
pub struct StripeElements {
    config: StripeConfig,
    client: Client,
}

impl StripeElements {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(STRIPE_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Build form params for `POST /v1/payment_methods`
    fn payment_method_params(
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Vec<(String, String)> {
        vec![
            ("type".to_string(), "card".to_string()),
            ("card[number]".to_string(), card.number.clone()),
            ("card[exp_month]".to_string(), card.exp_month.to_string()),
            ("card[exp_year]".to_string(), card.exp_year.to_string()),
            ("card[cvc]".to_string(), card.cvc.clone()),
            ("billing_details[name]".to_string(), billing.name.clone()),
            ("billing_details[email]".to_string(), billing.email.clone()),
            ("billing_details[phone]".to_string(), billing.phone.clone()),
            (
                "billing_details[address][line1]".to_string(),
                billing.address_line1.clone(),
            ),
            (
                "billing_details[address][city]".to_string(),
                billing.city.clone(),
            ),
            (
                "billing_details[address][postal_code]".to_string(),
                billing.postal_code.clone(),
            ),
        ]
    }

    /// Map a non-success Stripe response body to a typed error.
    /// Card errors are user-recoverable; anything else is a provider
    /// fault.
    fn map_error_body(status: reqwest::StatusCode, body: &str) -> CheckoutError {
        if let Ok(response) = serde_json::from_str::<StripeErrorResponse>(body) {
            if response.error.error_type.as_deref() == Some("card_error") {
                return CheckoutError::CardRejected {
                    reason: response.error.message,
                };
            }
            return CheckoutError::Provider {
                provider: "stripe".to_string(),
                message: response.error.message,
            };
        }
        CheckoutError::Provider {
            provider: "stripe".to_string(),
            message: format!("HTTP {}: {}", status, body),
        }
    }
}

/// Extract the payment-intent id from a client secret
/// (`pi_..._secret_...`).
fn intent_id_from_client_secret(client_secret: &str) -> CheckoutResult<&str> {
    match client_secret.split_once("_secret") {
        Some((id, _)) if !id.is_empty() => Ok(id),
        _ => Err(CheckoutError::Provider {
            provider: "stripe".to_string(),
            message: "malformed client secret".to_string(),
        }),
    }
}

#[async_trait]
impl PaymentProcessor for StripeElements {
    #[instrument(skip_all, fields(processor = "stripe"))]
    async fn create_payment_method(
        &self,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> CheckoutResult<PaymentMethod> {
        let url = format!("{}/v1/payment_methods", self.config.api_base_url);
        let params = Self::payment_method_params(card, billing);

        debug!("Tokenizing card into a payment method");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&params)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe payment_methods error: status={}", status);
            return Err(Self::map_error_body(status, &body));
        }

        let parsed: StripePaymentMethodResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created payment method: id={}", parsed.id);

        Ok(PaymentMethod { id: parsed.id })
    }

    #[instrument(skip_all, fields(processor = "stripe"))]
    async fn confirm_payment(
        &self,
        client_secret: &str,
        payment_method_id: &str,
    ) -> CheckoutResult<PaymentConfirmation> {
        let intent_id = intent_id_from_client_secret(client_secret)?;
        let url = format!(
            "{}/v1/payment_intents/{}/confirm",
            self.config.api_base_url, intent_id
        );

        let params = vec![
            ("client_secret".to_string(), client_secret.to_string()),
            ("payment_method".to_string(), payment_method_id.to_string()),
        ];

        debug!("Confirming payment intent: id={}", intent_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&params)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe confirm error: status={}", status);
            return Err(Self::map_error_body(status, &body));
        }

        let parsed: StripeIntentResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        let confirmation = PaymentConfirmation {
            id: parsed.id,
            status: IntentStatus::from(parsed.status.as_str()),
        };
        info!(
            "Confirmed payment intent: id={}, status={}",
            confirmation.id, confirmation.status
        );

        Ok(confirmation)
    }

    fn processor_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentMethodResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
    #[serde(rename = "type")]
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card() -> CardDetails {
        CardDetails {
            number: "4242424242424242".to_string(),
            exp_month: 12,
            exp_year: 2030,
            cvc: "123".to_string(),
        }
    }

    fn billing() -> BillingDetails {
        BillingDetails {
            name: "Marie Dupont".to_string(),
            email: "marie@example.fr".to_string(),
            phone: "0612345678".to_string(),
            address_line1: "12 rue des Lilas".to_string(),
            city: "Paris".to_string(),
            postal_code: "75011".to_string(),
        }
    }

    fn elements(base_url: &str) -> StripeElements {
        StripeElements::new(StripeConfig::new("pk_test_abc").with_api_base_url(base_url))
    }

    #[test]
    fn test_intent_id_from_client_secret() {
        assert_eq!(
            intent_id_from_client_secret("pi_3ABC_secret_xyz").unwrap(),
            "pi_3ABC"
        );
        assert!(intent_id_from_client_secret("garbage").is_err());
        assert!(intent_id_from_client_secret("_secret_xyz").is_err());
    }

    #[test]
    fn test_payment_method_params_shape() {
        let params = StripeElements::payment_method_params(&card(), &billing());
        assert!(params.contains(&("type".to_string(), "card".to_string())));
        assert!(params.contains(&(
            "card[number]".to_string(),
            "4242424242424242".to_string()
        )));
        assert!(params.contains(&(
            "billing_details[address][postal_code]".to_string(),
            "75011".to_string()
        )));
    }

    #[tokio::test]
    async fn test_create_payment_method_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .and(body_string_contains("type=card"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pm_123",
                "object": "payment_method"
            })))
            .mount(&server)
            .await;

        let result = elements(&server.uri())
            .create_payment_method(&card(), &billing())
            .await
            .unwrap();

        assert_eq!(result.id, "pm_123");
    }

    #[tokio::test]
    async fn test_card_error_maps_to_card_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {
                    "type": "card_error",
                    "code": "incorrect_number",
                    "message": "Your card number is incorrect."
                }
            })))
            .mount(&server)
            .await;

        let err = elements(&server.uri())
            .create_payment_method(&card(), &billing())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::CardRejected { .. }));
        assert!(err.is_user_recoverable());
    }

    #[tokio::test]
    async fn test_confirm_payment_succeeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_3ABC/confirm"))
            .and(body_string_contains("payment_method=pm_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_3ABC",
                "status": "succeeded"
            })))
            .mount(&server)
            .await;

        let confirmation = elements(&server.uri())
            .confirm_payment("pi_3ABC_secret_xyz", "pm_123")
            .await
            .unwrap();

        assert_eq!(confirmation.id, "pi_3ABC");
        assert!(confirmation.status.is_success());
    }

    #[tokio::test]
    async fn test_confirm_payment_non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_3ABC/confirm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_3ABC",
                "status": "requires_action"
            })))
            .mount(&server)
            .await;

        // The client reports the status verbatim; treating anything
        // other than `succeeded` as failure is the orchestrator's job.
        let confirmation = elements(&server.uri())
            .confirm_payment("pi_3ABC_secret_xyz", "pm_123")
            .await
            .unwrap();

        assert_eq!(confirmation.status, IntentStatus::RequiresAction);
        assert!(!confirmation.status.is_success());
    }

    #[tokio::test]
    async fn test_provider_error_on_unparseable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
            .mount(&server)
            .await;

        let err = elements(&server.uri())
            .create_payment_method(&card(), &billing())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Provider { .. }));
        assert!(err.is_retryable());
    }
}
