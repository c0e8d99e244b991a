//! # Checkout Step Machine
//!
//! Linear flow `AwaitingDelivery → AwaitingPayment → Confirmed`, with a
//! single user-initiated back-transition to edit delivery info. Form
//! data entered along the way is carried in the flow and never lost on
//! a transition.

use crate::cart::Cart;
use crate::delivery::{BillingInfo, DeliveryInfo, DeliveryZone};
use crate::error::{CheckoutError, CheckoutResult, Precondition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The current checkout step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Collecting delivery (and optionally billing) information
    AwaitingDelivery,
    /// Delivery info validated, waiting for a payment attempt
    AwaitingPayment,
    /// Payment succeeded
    Confirmed,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::AwaitingDelivery => "awaiting_delivery",
            CheckoutStep::AwaitingPayment => "awaiting_payment",
            CheckoutStep::Confirmed => "confirmed",
        }
    }
}

/// Data carried into the Confirmed state by a successful payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// The processor's payment confirmation (intent) id
    pub payment_confirmation_id: String,
    /// The client-generated order id sent to the backend
    pub order_id: String,
}

/// The checkout flow state machine.
///
/// Lives for one checkout session; a page reload loses it, which is an
/// accepted boundary. Every entry into `AwaitingPayment` bumps an
/// attempt epoch so results of network calls started under an earlier
/// epoch can be recognized as stale and discarded.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    delivery_info: Option<DeliveryInfo>,
    billing_info: Option<BillingInfo>,
    use_same_billing_address: bool,
    confirmation: Option<Confirmation>,
    attempt_epoch: u64,
}

impl CheckoutFlow {
    /// Enter the checkout flow.
    ///
    /// Preconditions: non-empty cart, a selected delivery zone, and a
    /// global delivery date. Any missing piece fails with
    /// `PreconditionFailed` and the caller redirects out of checkout.
    pub fn begin(
        cart: &Cart,
        zone: Option<&DeliveryZone>,
        delivery_date: Option<NaiveDate>,
    ) -> CheckoutResult<Self> {
        if cart.is_empty() {
            return Err(CheckoutError::PreconditionFailed(Precondition::EmptyCart));
        }
        if zone.is_none() {
            return Err(CheckoutError::PreconditionFailed(Precondition::MissingZone));
        }
        if delivery_date.is_none() {
            return Err(CheckoutError::PreconditionFailed(
                Precondition::MissingDeliveryDate,
            ));
        }

        Ok(Self {
            step: CheckoutStep::AwaitingDelivery,
            delivery_info: None,
            billing_info: None,
            use_same_billing_address: true,
            confirmation: None,
            attempt_epoch: 0,
        })
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Entered delivery info, if any (prefilled when editing)
    pub fn delivery_info(&self) -> Option<&DeliveryInfo> {
        self.delivery_info.as_ref()
    }

    pub fn use_same_billing_address(&self) -> bool {
        self.use_same_billing_address
    }

    /// The billing address in effect: the separately entered one, or a
    /// copy of the delivery info when `use_same_billing_address` is on.
    pub fn effective_billing(&self) -> Option<BillingInfo> {
        if self.use_same_billing_address {
            self.delivery_info.as_ref().map(BillingInfo::from_delivery)
        } else {
            self.billing_info.clone()
        }
    }

    /// Epoch of the current payment attempt window
    pub fn attempt_epoch(&self) -> u64 {
        self.attempt_epoch
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Submit the delivery step and advance to payment.
    ///
    /// The delivery info must validate; when a separate billing address
    /// is used it must validate too. On failure the flow stays in
    /// `AwaitingDelivery` with all entered data retained.
    pub fn submit_delivery(
        &mut self,
        delivery: DeliveryInfo,
        billing: Option<BillingInfo>,
        use_same_billing_address: bool,
    ) -> CheckoutResult<()> {
        if self.step != CheckoutStep::AwaitingDelivery {
            return Err(CheckoutError::InvalidTransition {
                from: self.step.as_str(),
                action: "submit delivery info",
            });
        }

        // Keep the entered data even when validation fails, so the
        // form can be prefilled for correction.
        self.use_same_billing_address = use_same_billing_address;
        self.delivery_info = Some(delivery);
        self.billing_info = billing;

        let delivery_ref = self
            .delivery_info
            .as_ref()
            .ok_or_else(|| CheckoutError::Internal("delivery info just set".into()))?;
        delivery_ref.validate().map_err(CheckoutError::Validation)?;

        if !use_same_billing_address {
            let billing_ref = self.billing_info.as_ref().ok_or_else(|| {
                let mut errors = crate::delivery::ValidationErrors::new();
                errors.push("billingAddress", "billing address is required");
                CheckoutError::Validation(errors)
            })?;
            billing_ref.validate().map_err(CheckoutError::Validation)?;
        }

        self.step = CheckoutStep::AwaitingPayment;
        self.attempt_epoch += 1;
        Ok(())
    }

    /// User-initiated return to the delivery step. Entered data is
    /// kept for prefill; the epoch bump invalidates any in-flight
    /// payment attempt.
    pub fn edit_delivery(&mut self) -> CheckoutResult<()> {
        if self.step != CheckoutStep::AwaitingPayment {
            return Err(CheckoutError::InvalidTransition {
                from: self.step.as_str(),
                action: "edit delivery info",
            });
        }
        self.step = CheckoutStep::AwaitingDelivery;
        self.attempt_epoch += 1;
        Ok(())
    }

    /// Transition to Confirmed. Driven exclusively by the payment
    /// orchestrator on success; `epoch` is the attempt epoch captured
    /// before the network calls, so a result arriving after the user
    /// left the payment step is rejected as stale.
    pub fn confirm(&mut self, confirmation: Confirmation, epoch: u64) -> CheckoutResult<()> {
        if self.step != CheckoutStep::AwaitingPayment {
            return Err(CheckoutError::StaleAttempt);
        }
        if epoch != self.attempt_epoch {
            return Err(CheckoutError::StaleAttempt);
        }
        self.confirmation = Some(confirmation);
        self.step = CheckoutStep::Confirmed;
        Ok(())
    }
}
