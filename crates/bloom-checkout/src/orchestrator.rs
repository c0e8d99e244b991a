//! # Payment Orchestrator
//!
//! Drives one payment attempt end to end: tokenize the card, create a
//! payment intent on the backend, confirm it with the processor,
//! transition the checkout flow, clear the cart, and dispatch the
//! receipt. The phases are strictly ordered and a failure in any of
//! the first three leaves the flow in `AwaitingPayment` with the cart
//! intact, so the user can retry.

use crate::backend::{BoxedPaymentBackend, CreateIntentRequest};
use crate::cart_store::CartStore;
use crate::receipt::{
    BoxedReceiptDispatcher, ReceiptCustomer, ReceiptDelivery, ReceiptItem, ReceiptRequest,
};
use bloom_core::{
    eur_to_cents, BillingDetails, BoxedPaymentProcessor, CardDetails, CheckoutError,
    CheckoutFlow, CheckoutResult, CheckoutStep, Confirmation, DeliveryInfo, CURRENCY,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Smallest charge the processor accepts, in cents
pub const MINIMUM_CHARGE_CENTS: i64 = 50;

/// Result of a completed payment attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub payment_intent_id: String,
    pub order_id: String,
    /// Whether the receipt email went out. The order stands either way.
    pub receipt_sent: bool,
}

/// Coordinates the processor, the backend, and the receipt dispatcher
/// for the payment step.
pub struct PaymentOrchestrator {
    processor: BoxedPaymentProcessor,
    backend: BoxedPaymentBackend,
    receipts: BoxedReceiptDispatcher,
    in_flight: bool,
    /// Idempotency key for the current attempt epoch. Reused across
    /// retries within the same epoch so the backend can dedupe; a new
    /// epoch gets a new key.
    idempotency: Option<(u64, String)>,
}

impl PaymentOrchestrator {
    pub fn new(
        processor: BoxedPaymentProcessor,
        backend: BoxedPaymentBackend,
        receipts: BoxedReceiptDispatcher,
    ) -> Self {
        Self {
            processor,
            backend,
            receipts,
            in_flight: false,
            idempotency: None,
        }
    }

    /// Run one payment attempt.
    ///
    /// Only valid while the flow is awaiting payment; a second call
    /// while an attempt is running fails with `AttemptInFlight`
    /// without touching anything. On success the flow is `Confirmed`
    /// and the cart has been cleared.
    #[instrument(skip_all, fields(processor = self.processor.processor_name()))]
    pub async fn pay(
        &mut self,
        flow: &mut CheckoutFlow,
        cart_store: &mut CartStore,
        card: &CardDetails,
    ) -> CheckoutResult<PaymentOutcome> {
        if self.in_flight {
            return Err(CheckoutError::AttemptInFlight);
        }
        if flow.step() != CheckoutStep::AwaitingPayment {
            return Err(CheckoutError::InvalidTransition {
                from: flow.step().as_str(),
                action: "submit payment",
            });
        }

        let amount_cents = eur_to_cents(cart_store.cart().total);
        if amount_cents < MINIMUM_CHARGE_CENTS {
            return Err(CheckoutError::BelowMinimumCharge {
                amount_cents,
                minimum_cents: MINIMUM_CHARGE_CENTS,
            });
        }

        self.in_flight = true;
        let result = self.attempt(flow, cart_store, card, amount_cents).await;
        self.in_flight = false;
        result
    }

    async fn attempt(
        &mut self,
        flow: &mut CheckoutFlow,
        cart_store: &mut CartStore,
        card: &CardDetails,
        amount_cents: i64,
    ) -> CheckoutResult<PaymentOutcome> {
        let epoch = flow.attempt_epoch();
        let delivery = flow
            .delivery_info()
            .ok_or_else(|| CheckoutError::Internal("payment step without delivery info".into()))?
            .clone();
        let billing_details = Self::billing_details(flow, &delivery)?;

        // Phase 1: tokenize the card
        let payment_method = self
            .processor
            .create_payment_method(card, &billing_details)
            .await?;

        // Phase 2: create the intent on the backend
        let order_id = format!("ORDER_{}", Utc::now().timestamp_millis());
        let idempotency_key = self.idempotency_key_for(epoch);
        let request = Self::intent_request(cart_store, &delivery, &order_id, &payment_method.id, amount_cents);
        let intent = self.backend.create_intent(&request, &idempotency_key).await?;
        let client_secret = intent
            .client_secret
            .ok_or(CheckoutError::MissingClientSecret)?;

        // Phase 3: confirm with the processor
        let confirmation = self
            .processor
            .confirm_payment(&client_secret, &payment_method.id)
            .await?;
        if !confirmation.status.is_success() {
            return Err(CheckoutError::PaymentDeclined {
                status: confirmation.status,
            });
        }

        // Phase 4: commit. The stale-attempt check happens here, before
        // any side effect, so a result arriving after the user moved on
        // changes nothing.
        let payment_intent_id = confirmation.id.clone();
        flow.confirm(
            Confirmation {
                payment_confirmation_id: confirmation.id,
                order_id: order_id.clone(),
            },
            epoch,
        )?;

        info!(
            "Payment succeeded: order_id={}, intent={}",
            order_id, payment_intent_id
        );

        let receipt = Self::receipt_request(cart_store, &delivery, &payment_intent_id, &order_id);
        // From here on the charge stands: a failure clearing the cart
        // or sending the receipt is logged, never returned.
        if let Err(e) = cart_store.clear() {
            warn!(
                "Cart clear failed after successful payment: order_id={}, error={}",
                order_id, e
            );
        }
        self.idempotency = None;

        // Best effort: the payment already went through, so a receipt
        // failure is logged and reported, never propagated.
        let receipt_sent = match self.receipts.send(&receipt).await {
            Ok(response) => response.receipt_sent,
            Err(e) => {
                warn!("Receipt dispatch failed: order_id={}, error={}", order_id, e);
                false
            }
        };

        Ok(PaymentOutcome {
            payment_intent_id,
            order_id,
            receipt_sent,
        })
    }

    /// The idempotency key for this attempt epoch, generated on first
    /// use and reused on retries within the epoch.
    fn idempotency_key_for(&mut self, epoch: u64) -> String {
        match &self.idempotency {
            Some((held_epoch, key)) if *held_epoch == epoch => key.clone(),
            _ => {
                let key = Uuid::new_v4().to_string();
                self.idempotency = Some((epoch, key.clone()));
                key
            }
        }
    }

    fn billing_details(
        flow: &CheckoutFlow,
        delivery: &DeliveryInfo,
    ) -> CheckoutResult<BillingDetails> {
        let billing = flow
            .effective_billing()
            .ok_or_else(|| CheckoutError::Internal("payment step without billing info".into()))?;

        Ok(BillingDetails {
            name: format!("{} {}", billing.first_name, billing.last_name),
            email: billing.email.unwrap_or_else(|| delivery.email.clone()),
            phone: billing.phone.unwrap_or_else(|| delivery.phone.clone()),
            address_line1: billing.address,
            city: billing.city,
            postal_code: billing.postal_code,
        })
    }

    fn intent_request(
        cart_store: &CartStore,
        delivery: &DeliveryInfo,
        order_id: &str,
        payment_method_id: &str,
        amount_cents: i64,
    ) -> CreateIntentRequest {
        let cart = cart_store.cart();

        let mut metadata = HashMap::new();
        metadata.insert("itemCount".to_string(), cart.total_item_count().to_string());
        if let Some(date) = cart_store.global_delivery_date() {
            metadata.insert("deliveryDate".to_string(), date.to_string());
        }
        metadata.insert(
            "timeSlot".to_string(),
            cart_store.global_time_slot().as_str().to_string(),
        );
        if let Some(zone) = cart_store.selected_zone() {
            metadata.insert("deliveryZone".to_string(), zone.name.clone());
        }
        if let Some(code) = &cart.coupon_code {
            metadata.insert("couponCode".to_string(), code.clone());
        }

        CreateIntentRequest {
            amount: amount_cents,
            currency: CURRENCY.to_string(),
            description: format!("Commande {}", order_id),
            order_id: order_id.to_string(),
            payment_method_id: payment_method_id.to_string(),
            receipt_email: delivery.email.clone(),
            metadata,
        }
    }

    /// Snapshot the receipt data before the cart is cleared
    fn receipt_request(
        cart_store: &CartStore,
        delivery: &DeliveryInfo,
        payment_intent_id: &str,
        order_id: &str,
    ) -> ReceiptRequest {
        let cart = cart_store.cart();

        ReceiptRequest {
            payment_intent_id: payment_intent_id.to_string(),
            order_id: order_id.to_string(),
            amount: cart.total,
            currency: CURRENCY.to_string(),
            customer_info: ReceiptCustomer {
                name: delivery.full_name(),
                email: delivery.email.clone(),
                phone: delivery.phone.clone(),
            },
            delivery_info: ReceiptDelivery {
                address: delivery.address.clone(),
                city: delivery.city.clone(),
                postal_code: delivery.postal_code.clone(),
                instructions: delivery.instructions.clone(),
            },
            payment_date: Utc::now().to_rfc3339(),
            items: cart
                .items
                .iter()
                .map(|line| ReceiptItem {
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    price: line.product.price,
                })
                .collect(),
        }
    }
}
