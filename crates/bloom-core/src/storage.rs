//! # Cart Persistence
//!
//! Key-value persistence seam for the cart store, plus the JSON schema
//! persisted under it. Dates cross the boundary as ISO-8601 strings
//! and are reconstructed into typed values on load; forgetting that
//! reconstruction is a correctness bug, so it lives here behind a
//! single tested function pair.

use crate::cart::Cart;
use crate::delivery::{DeliveryZone, TimeSlot};
use crate::error::{CheckoutError, CheckoutResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Namespaced key the cart snapshot is stored under
pub const CART_STORAGE_KEY: &str = "bloom.cart.v1";

/// Durable client-side key-value storage.
///
/// Production backs this with whatever the host platform offers;
/// tests substitute `MemoryStorage`.
pub trait CartStorage: Send + Sync {
    fn load(&self, key: &str) -> CheckoutResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> CheckoutResult<()>;
    fn remove(&self, key: &str) -> CheckoutResult<()>;
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> CheckoutResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CheckoutError::Storage("storage lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> CheckoutResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CheckoutError::Storage("storage lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CheckoutResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CheckoutError::Storage("storage lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// The single JSON blob persisted across sessions: cart contents plus
/// the cart-level scheduling fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    pub cart: Cart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub global_time_slot: TimeSlot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_zone: Option<DeliveryZone>,
}

impl PersistedCart {
    /// Serialize for storage; timestamps become ISO-8601 strings
    pub fn to_json(&self) -> CheckoutResult<String> {
        serde_json::to_string(self).map_err(|e| CheckoutError::Serialization(e.to_string()))
    }

    /// Deserialize a stored snapshot, reconstructing typed dates from
    /// their ISO-8601 string form.
    pub fn from_json(raw: &str) -> CheckoutResult<Self> {
        serde_json::from_str(raw).map_err(|e| CheckoutError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLineItem;
    use crate::product::Product;
    use chrono::{DateTime, TimeZone, Utc};

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("missing").unwrap(), None);

        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));

        storage.remove("k").unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
    }

    #[test]
    fn test_persisted_cart_reconstructs_dates() {
        let instant: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let mut cart = Cart::empty();
        cart.items.push(CartLineItem::new(
            &Product::new("bouquet", "Bouquet", 35.90),
            1,
            Some(instant),
            None,
        ));
        cart.recompute();

        let snapshot = PersistedCart {
            cart,
            global_delivery_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            global_time_slot: TimeSlot::FourteenSixteen,
            selected_zone: Some(DeliveryZone::new("1", "Paris", "75001")),
        };

        let json = snapshot.to_json().unwrap();
        // The wire form is a string, not a native date
        assert!(json.contains("2025-06-01T10:00:00Z"));

        let restored = PersistedCart::from_json(&json).unwrap();
        // And the load path hands back a typed instant, not a string
        assert_eq!(restored.cart.items[0].delivery_date, Some(instant));
        assert_eq!(
            restored.global_delivery_date,
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(restored.global_time_slot, TimeSlot::FourteenSixteen);
        assert_eq!(restored.selected_zone.unwrap().postal_code, "75001");
    }

    #[test]
    fn test_missing_time_slot_defaults() {
        let json = r#"{"cart":{"items":[],"subtotal":0.0,"tax":0.0,"shippingCost":0.0,"total":0.0}}"#;
        let restored = PersistedCart::from_json(json).unwrap();
        assert_eq!(restored.global_time_slot, TimeSlot::TenTwelve);
    }
}
