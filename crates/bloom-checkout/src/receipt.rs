//! # Receipt Dispatch
//!
//! Best-effort receipt/invoice email after a successful payment. A
//! failure here never fails the order: the payment already went
//! through, so the orchestrator logs the failure and reports the
//! outcome with `receipt_sent = false`.

use crate::config::{BackendConfig, BACKEND_TIMEOUT_SECS};
use async_trait::async_trait;
use bloom_core::{CheckoutError, CheckoutResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A purchased line as it appears on the receipt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price in euros
    pub price: f64,
}

/// The buyer as shown on the receipt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Delivery address block on the receipt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDelivery {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Everything the backend needs to render and send the receipt email
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub payment_intent_id: String,
    pub order_id: String,
    /// Total charged, in euros
    pub amount: f64,
    pub currency: String,
    pub customer_info: ReceiptCustomer,
    pub delivery_info: ReceiptDelivery,
    /// ISO-8601 timestamp of the payment
    pub payment_date: String,
    pub items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub receipt_sent: bool,
    #[serde(default)]
    pub invoice_sent: bool,
    #[serde(default)]
    pub recipient_email: Option<String>,
}

/// Backend contract for sending the receipt email
#[async_trait]
pub trait ReceiptDispatcher: Send + Sync {
    async fn send(&self, request: &ReceiptRequest) -> CheckoutResult<ReceiptResponse>;
}

/// Type alias for a shared dispatcher (dynamic dispatch)
pub type BoxedReceiptDispatcher = Arc<dyn ReceiptDispatcher>;

/// HTTP implementation backed by the storefront backend
pub struct HttpReceiptClient {
    config: BackendConfig,
    client: Client,
}

impl HttpReceiptClient {
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl ReceiptDispatcher for HttpReceiptClient {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn send(&self, request: &ReceiptRequest) -> CheckoutResult<ReceiptResponse> {
        let url = format!("{}/receipts/send", self.config.base_url);

        debug!("Dispatching receipt email");

        let response = self
            .client
            .post(&url)
            .json(request)
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

        let parsed: ReceiptResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;

        info!(
            "Receipt dispatched: sent={}, recipient={:?}",
            parsed.receipt_sent, parsed.recipient_email
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ReceiptRequest {
        ReceiptRequest {
            payment_intent_id: "pi_3ABC".to_string(),
            order_id: "ORDER_1".to_string(),
            amount: 71.80,
            currency: "eur".to_string(),
            customer_info: ReceiptCustomer {
                name: "Marie Dupont".to_string(),
                email: "marie@example.fr".to_string(),
                phone: "0612345678".to_string(),
            },
            delivery_info: ReceiptDelivery {
                address: "12 rue des Lilas".to_string(),
                city: "Paris".to_string(),
                postal_code: "75011".to_string(),
                instructions: None,
            },
            payment_date: "2025-06-01T10:00:00Z".to_string(),
            items: vec![ReceiptItem {
                name: "Bouquet Printemps".to_string(),
                quantity: 2,
                price: 35.90,
            }],
        }
    }

    #[test]
    fn test_receipt_wire_shape() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["paymentIntentId"], "pi_3ABC");
        assert_eq!(json["customerInfo"]["name"], "Marie Dupont");
        assert_eq!(json["deliveryInfo"]["postalCode"], "75011");
        assert_eq!(json["items"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_send_receipt_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/receipts/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "receiptSent": true,
                "invoiceSent": false,
                "recipientEmail": "marie@example.fr"
            })))
            .mount(&server)
            .await;

        let client = HttpReceiptClient::new(BackendConfig::new(server.uri()));
        let response = client.send(&request()).await.unwrap();

        assert!(response.receipt_sent);
        assert_eq!(response.recipient_email.as_deref(), Some("marie@example.fr"));
    }

    #[tokio::test]
    async fn test_send_receipt_failure_is_an_error_for_the_caller_to_soften() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/receipts/send"))
            .respond_with(ResponseTemplate::new(500).set_body_string("mailer down"))
            .mount(&server)
            .await;

        let client = HttpReceiptClient::new(BackendConfig::new(server.uri()));
        let err = client.send(&request()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Backend { status: 500, .. }));
    }
}
