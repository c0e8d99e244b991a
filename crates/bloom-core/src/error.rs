//! # Checkout Error Types
//!
//! Typed error handling for the bloom-cart checkout core.
//! All fallible operations return `Result<T, CheckoutError>`.

use crate::delivery::ValidationErrors;
use crate::processor::IntentStatus;
use thiserror::Error;

/// A checkout precondition that was not met when entering the flow.
///
/// These are not step-local errors: the caller is expected to send the
/// user back out of checkout (e.g. to the shop page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The cart has no line items
    EmptyCart,
    /// No delivery zone has been selected
    MissingZone,
    /// No global delivery date has been set
    MissingDeliveryDate,
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Precondition::EmptyCart => "cart is empty",
            Precondition::MissingZone => "no delivery zone selected",
            Precondition::MissingDeliveryDate => "no delivery date set",
        };
        write!(f, "{}", msg)
    }
}

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing env vars, invalid key formats)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Form data failed field validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Checkout entry precondition not met (redirect out of the flow)
    #[error("Checkout precondition failed: {0}")]
    PreconditionFailed(Precondition),

    /// An operation was attempted from the wrong checkout step
    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    /// The processor rejected the card data during tokenization.
    /// Terminal for this attempt; the user must correct their input.
    #[error("Card rejected: {reason}")]
    CardRejected { reason: String },

    /// Payment confirmation came back with a non-success status
    #[error("Payment declined: status was {status}")]
    PaymentDeclined { status: IntentStatus },

    /// Cart total is below the processor's minimum charge
    #[error("Amount {amount_cents} cents is below the minimum charge of {minimum_cents} cents")]
    BelowMinimumCharge {
        amount_cents: i64,
        minimum_cents: i64,
    },

    /// The backend response did not carry a client secret
    #[error("Backend response is missing the client secret")]
    MissingClientSecret,

    /// Backend API returned an error response
    #[error("Backend error [{status}]: {message}")]
    Backend { status: u16, message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error (timeouts included)
    #[error("Network error: {0}")]
    Network(String),

    /// A second payment attempt was submitted while one is in flight
    #[error("A payment attempt is already in flight")]
    AttemptInFlight,

    /// An async continuation arrived after the flow left the state
    /// that initiated the call; its result must be discarded.
    #[error("Stale payment attempt: the checkout flow has moved on")]
    StaleAttempt,

    /// Persistence read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Returns true if retrying the same operation may succeed
    /// without new user input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_)
                | CheckoutError::Backend { .. }
                | CheckoutError::Provider { .. }
                | CheckoutError::MissingClientSecret
        )
    }

    /// Returns true if the user can recover by correcting their input
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_)
                | CheckoutError::CardRejected { .. }
                | CheckoutError::PaymentDeclined { .. }
                | CheckoutError::BelowMinimumCharge { .. }
        )
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::Network("timeout".into()).is_retryable());
        assert!(CheckoutError::Backend {
            status: 502,
            message: "bad gateway".into()
        }
        .is_retryable());
        assert!(CheckoutError::MissingClientSecret.is_retryable());
        assert!(!CheckoutError::CardRejected {
            reason: "invalid number".into()
        }
        .is_retryable());
        assert!(!CheckoutError::AttemptInFlight.is_retryable());
    }

    #[test]
    fn test_user_recoverable_errors() {
        assert!(CheckoutError::CardRejected {
            reason: "expired".into()
        }
        .is_user_recoverable());
        assert!(CheckoutError::PaymentDeclined {
            status: IntentStatus::RequiresAction
        }
        .is_user_recoverable());
        assert!(!CheckoutError::Network("down".into()).is_user_recoverable());
    }

    #[test]
    fn test_precondition_display() {
        let err = CheckoutError::PreconditionFailed(Precondition::MissingZone);
        assert_eq!(
            err.to_string(),
            "Checkout precondition failed: no delivery zone selected"
        );
    }
}
