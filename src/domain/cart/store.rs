use uuid::Uuid;

use crate::domain::shared::{MenuItemId, VendorId};
use crate::event_sourcing::{Aggregate, EventEnvelope};
use super::aggregate::Cart;
use super::commands::CartCommand;
use super::errors::CartError;
use super::events::CartEvent;
use super::value_objects::CartItem;

// ============================================================================
// Cart Store - the cart owned by one customer session
// ============================================================================
//
// Created empty at session start and dropped at logout. Every accepted
// command is journaled so the cart can be rebuilt by replay. A clear
// restarts the journal; sequence numbers keep counting.
//
// ============================================================================

#[derive(Debug)]
pub struct CartStore {
    cart_id: Uuid,
    cart: Cart,
    journal: Vec<EventEnvelope<CartEvent>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        Self {
            cart_id: Uuid::new_v4(),
            cart: Cart::new(),
            journal: Vec::new(),
        }
    }

    pub fn cart_id(&self) -> Uuid {
        self.cart_id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn journal(&self) -> &[EventEnvelope<CartEvent>] {
        &self.journal
    }

    pub fn add_item(
        &mut self,
        item: CartItem,
        vendor_id: VendorId,
        vendor_name: impl Into<String>,
    ) -> Result<Vec<CartEvent>, CartError> {
        self.dispatch(CartCommand::AddItem {
            item,
            vendor_id,
            vendor_name: vendor_name.into(),
        })
    }

    pub fn remove_item(&mut self, menu_item_id: MenuItemId) -> Result<Vec<CartEvent>, CartError> {
        self.dispatch(CartCommand::RemoveItem { menu_item_id })
    }

    pub fn clear(&mut self) -> Result<Vec<CartEvent>, CartError> {
        self.dispatch(CartCommand::Clear)
    }

    /// Rebuild the cart from the journal alone
    pub fn replay(&self) -> Cart {
        Cart::load_from_events(&self.journal)
    }

    fn dispatch(&mut self, command: CartCommand) -> Result<Vec<CartEvent>, CartError> {
        let events = self.cart.execute(&command).map_err(|e| {
            tracing::debug!(cart_id = %self.cart_id, error = %e, "Cart command rejected");
            e
        })?;

        let correlation_id = Uuid::new_v4();
        for event in &events {
            if let CartEvent::VendorSelected(selected) = event {
                if !selected.discarded.is_empty() {
                    tracing::info!(
                        cart_id = %self.cart_id,
                        previous_vendor = ?selected.previous_vendor_id,
                        vendor_id = %selected.vendor_id,
                        discarded = selected.discarded.len(),
                        "Vendor switched, previous cart items discarded"
                    );
                }
            }

            let sequence_number = self.journal.last().map_or(0, |e| e.sequence_number) + 1;
            if matches!(event, CartEvent::Cleared) {
                // Nothing before a clear contributes to the cart any more
                self.journal.clear();
            }
            self.journal.push(EventEnvelope::new(
                self.cart_id,
                sequence_number,
                event.clone(),
                correlation_id,
            ));
        }

        Ok(events)
    }
}
