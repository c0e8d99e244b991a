//! # Cart Store
//!
//! The durable cart: line items, coupon, and the cart-level scheduling
//! selections (global delivery date, time slot, zone). Every mutation
//! recomputes totals where prices are affected and persists the whole
//! snapshot, so a restart always comes back to the last consistent
//! state.

use crate::coupon::{CouponOutcome, CouponValidator};
use bloom_core::{
    Cart, CartLineItem, CartStorage, CheckoutResult, DeliveryZone, PersistedCart, Product,
    TimeSlot,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Persistence-backed cart state
pub struct CartStore {
    cart: Cart,
    global_delivery_date: Option<NaiveDate>,
    global_time_slot: TimeSlot,
    selected_zone: Option<DeliveryZone>,
    storage: Arc<dyn CartStorage>,
    storage_key: String,
}

impl CartStore {
    /// Create an empty store without touching storage
    pub fn new(storage: Arc<dyn CartStorage>, storage_key: impl Into<String>) -> Self {
        Self {
            cart: Cart::empty(),
            global_delivery_date: None,
            global_time_slot: TimeSlot::default(),
            selected_zone: None,
            storage,
            storage_key: storage_key.into(),
        }
    }

    /// Load the persisted snapshot, or start empty when there is none.
    /// A snapshot that no longer parses is discarded rather than
    /// wedging the store.
    pub fn load(storage: Arc<dyn CartStorage>, storage_key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, storage_key);

        match store.storage.load(&store.storage_key) {
            Ok(Some(raw)) => match PersistedCart::from_json(&raw) {
                Ok(snapshot) => {
                    debug!(
                        "Restored cart: {} line(s), {} item(s)",
                        snapshot.cart.items.len(),
                        snapshot.cart.total_item_count()
                    );
                    store.cart = snapshot.cart;
                    store.global_delivery_date = snapshot.global_delivery_date;
                    store.global_time_slot = snapshot.global_time_slot;
                    store.selected_zone = snapshot.selected_zone;
                }
                Err(e) => {
                    warn!("Discarding unreadable cart snapshot: {}", e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!("Cart storage unavailable, starting empty: {}", e);
            }
        }

        store
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn global_delivery_date(&self) -> Option<NaiveDate> {
        self.global_delivery_date
    }

    pub fn global_time_slot(&self) -> TimeSlot {
        self.global_time_slot
    }

    pub fn selected_zone(&self) -> Option<&DeliveryZone> {
        self.selected_zone.as_ref()
    }

    /// Sum of quantities across all lines (badge count)
    pub fn total_item_count(&self) -> u32 {
        self.cart.total_item_count()
    }

    /// Add a product to the cart. An add matching an existing line
    /// (same product, same delivery instant) increases that line's
    /// quantity; otherwise a new line is appended.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        delivery_date: Option<DateTime<Utc>>,
        special_instructions: Option<String>,
    ) -> CheckoutResult<()> {
        match self
            .cart
            .items
            .iter_mut()
            .find(|line| line.merges_with(&product.id, delivery_date))
        {
            Some(line) => {
                line.quantity += quantity.max(1);
                debug!("Merged into existing line: id={}", line.id);
            }
            None => {
                let line = CartLineItem::new(product, quantity, delivery_date, special_instructions);
                debug!("Added new line: id={}", line.id);
                self.cart.items.push(line);
            }
        }

        self.cart.recompute();
        self.persist()
    }

    /// Remove a line by id. Unknown ids are a no-op.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, line_id: &str) -> CheckoutResult<()> {
        let before = self.cart.items.len();
        self.cart.items.retain(|line| line.id != line_id);
        if self.cart.items.len() == before {
            return Ok(());
        }

        self.cart.recompute();
        self.persist()
    }

    /// Set a line's quantity. Zero removes the line; unknown ids are a
    /// no-op.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, line_id: &str, quantity: u32) -> CheckoutResult<()> {
        if quantity == 0 {
            return self.remove_item(line_id);
        }

        let Some(line) = self.cart.items.iter_mut().find(|line| line.id == line_id) else {
            return Ok(());
        };
        line.quantity = quantity;

        self.cart.recompute();
        self.persist()
    }

    /// Reschedule a single line. Does not affect totals.
    pub fn update_delivery_date(
        &mut self,
        line_id: &str,
        delivery_date: Option<DateTime<Utc>>,
    ) -> CheckoutResult<()> {
        let Some(line) = self.cart.items.iter_mut().find(|line| line.id == line_id) else {
            return Ok(());
        };
        line.delivery_date = delivery_date;
        self.persist()
    }

    /// Update a line's florist note. Does not affect totals.
    pub fn update_special_instructions(
        &mut self,
        line_id: &str,
        instructions: Option<String>,
    ) -> CheckoutResult<()> {
        let Some(line) = self.cart.items.iter_mut().find(|line| line.id == line_id) else {
            return Ok(());
        };
        line.special_instructions = instructions;
        self.persist()
    }

    /// Set the cart-wide delivery date (checkout precondition)
    pub fn set_global_delivery_date(&mut self, date: Option<NaiveDate>) -> CheckoutResult<()> {
        self.global_delivery_date = date;
        self.persist()
    }

    /// Set the cart-wide delivery window
    pub fn set_global_time_slot(&mut self, slot: TimeSlot) -> CheckoutResult<()> {
        self.global_time_slot = slot;
        self.persist()
    }

    /// Select the delivery zone (checkout precondition)
    pub fn set_selected_zone(&mut self, zone: Option<DeliveryZone>) -> CheckoutResult<()> {
        self.selected_zone = zone;
        self.persist()
    }

    /// Validate a coupon and apply the outcome atomically: either the
    /// code, the discount, and the recomputed totals all change
    /// together, or the cart is untouched.
    #[instrument(skip(self, validator))]
    pub async fn apply_coupon(
        &mut self,
        validator: &dyn CouponValidator,
        code: &str,
    ) -> CheckoutResult<CouponOutcome> {
        let outcome = validator.validate(code).await?;

        if let CouponOutcome::Accepted { discount_amount } = outcome {
            self.cart.coupon_code = Some(code.to_string());
            self.cart.discount_amount = Some(discount_amount);
            self.cart.recompute();
            self.persist()?;
            info!("Coupon applied: code={}, discount={}", code, discount_amount);
        } else {
            debug!("Coupon not applied: code={}", code);
        }

        Ok(outcome)
    }

    /// Remove any applied coupon and restore undiscounted totals
    pub fn remove_coupon(&mut self) -> CheckoutResult<()> {
        if self.cart.coupon_code.is_none() && self.cart.discount_amount.is_none() {
            return Ok(());
        }
        self.cart.coupon_code = None;
        self.cart.discount_amount = None;
        self.cart.recompute();
        self.persist()
    }

    /// Empty the cart after a completed order: items, coupon, and the
    /// scheduling selections all reset, and the snapshot is persisted
    /// so a restart does not resurrect the purchased cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> CheckoutResult<()> {
        self.cart = Cart::empty();
        self.global_delivery_date = None;
        self.global_time_slot = TimeSlot::default();
        self.selected_zone = None;
        info!("Cart cleared");
        self.persist()
    }

    fn persist(&self) -> CheckoutResult<()> {
        let snapshot = PersistedCart {
            cart: self.cart.clone(),
            global_delivery_date: self.global_delivery_date,
            global_time_slot: self.global_time_slot,
            selected_zone: self.selected_zone.clone(),
        };
        self.storage.save(&self.storage_key, &snapshot.to_json()?)
    }
}
