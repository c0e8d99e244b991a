//! # Payment Processor Trait
//!
//! Seam between the checkout core and the payment processor's client
//! SDK. The orchestrator only ever talks to this trait; the Stripe
//! implementation lives in `bloom-stripe` and tests substitute stubs.

use crate::delivery::DeliveryInfo;
use crate::error::CheckoutResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Raw payment-instrument details as entered by the user.
///
/// Never persisted and never logged by this core: the `Debug` impl
/// redacts everything but the last four digits.
#[derive(Clone)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Char-based tail: a byte slice could split a multi-byte char
        // and panic inside a logging call.
        let chars: Vec<char> = self.number.chars().collect();
        let last4: String = if chars.len() >= 4 {
            chars[chars.len() - 4..].iter().collect()
        } else {
            "????".to_string()
        };
        f.debug_struct("CardDetails")
            .field("number", &format!("**** {}", last4))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .finish()
    }
}

/// Cardholder details attached to the payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
    pub postal_code: String,
}

impl BillingDetails {
    /// Build billing details from the delivery form
    pub fn from_delivery(delivery: &DeliveryInfo) -> Self {
        Self {
            name: delivery.full_name(),
            email: delivery.email.clone(),
            phone: delivery.phone.clone(),
            address_line1: delivery.address.clone(),
            city: delivery.city.clone(),
            postal_code: delivery.postal_code.clone(),
        }
    }
}

/// An opaque tokenized payment method issued by the processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: String,
}

/// Payment-intent status as reported by the processor.
///
/// Only `Succeeded` counts as success; everything else, including
/// statuses this flow has never seen, is treated as failure. This
/// checkout does not support asynchronous/delayed payment methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Unknown(String),
}

impl IntentStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, IntentStatus::Succeeded)
    }

    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Unknown(other) => other,
        }
    }
}

impl From<&str> for IntentStatus {
    fn from(value: &str) -> Self {
        match value {
            "requires_payment_method" => IntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => IntentStatus::RequiresConfirmation,
            "requires_action" => IntentStatus::RequiresAction,
            "processing" => IntentStatus::Processing,
            "succeeded" => IntentStatus::Succeeded,
            "canceled" => IntentStatus::Canceled,
            other => IntentStatus::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a confirmation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// The payment intent id
    pub id: String,
    pub status: IntentStatus,
}

/// Client-side contract with the payment processor's SDK.
///
/// Two calls, strictly sequential in the checkout flow: tokenize the
/// card into a payment method, then confirm an intent with the client
/// secret issued by the backend.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Exchange raw card data for an opaque payment-method token.
    ///
    /// Invalid card data is terminal for the attempt: the caller
    /// reports it and waits for new input, no retry.
    async fn create_payment_method(
        &self,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> CheckoutResult<PaymentMethod>;

    /// Finalize the charge authorized by `client_secret`
    async fn confirm_payment(
        &self,
        client_secret: &str,
        payment_method_id: &str,
    ) -> CheckoutResult<PaymentConfirmation>;

    /// Processor name (for logging)
    fn processor_name(&self) -> &'static str;
}

/// Type alias for a shared processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
