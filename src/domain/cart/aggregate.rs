use serde::{Deserialize, Serialize};

use crate::domain::shared::{MenuItemId, Money, VendorId, CustomerId, FLAT_DELIVERY_FEE};
use crate::event_sourcing::Aggregate;
use super::value_objects::{CartItem, PlaceOrderRequest};
use super::events::*;
use super::commands::CartCommand;
use super::errors::CartError;

// ============================================================================
// Cart Aggregate - single-vendor, quantity-aggregated selection
// ============================================================================
//
// Invariants:
// - items from at most one vendor at any time
// - non-empty items imply a vendor is set (an empty cart may keep its vendor
//   after the last item is removed; only Clear unsets it)
// - at most one line per menu item, in first-appearance order
// - every quantity is >= 1
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    vendor_id: Option<VendorId>,
    vendor_name: String,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines (the cart badge count)
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Quantity currently selected for a menu item, 0 if absent
    pub fn quantity_of(&self, menu_item_id: MenuItemId) -> u32 {
        self.find(menu_item_id).map_or(0, |item| item.quantity)
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn delivery_fee(&self) -> Money {
        FLAT_DELIVERY_FEE
    }

    pub fn total(&self) -> Money {
        self.subtotal() + self.delivery_fee()
    }

    /// Snapshot the cart into an order-creation request. The cart itself is
    /// left untouched.
    pub fn to_order_request(
        &self,
        customer_id: CustomerId,
        delivery_address: impl Into<String>,
        special_instructions: Option<String>,
    ) -> Result<PlaceOrderRequest, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let vendor_id = self.vendor_id.ok_or(CartError::Empty)?;

        Ok(PlaceOrderRequest {
            customer_id,
            vendor_id,
            vendor_name: self.vendor_name.clone(),
            delivery_address: delivery_address.into(),
            special_instructions,
            items: self.items.clone(),
        })
    }

    fn find(&self, menu_item_id: MenuItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.menu_item_id == menu_item_id)
    }

    fn find_mut(&mut self, menu_item_id: MenuItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.menu_item_id == menu_item_id)
    }

    fn handle_add(
        &self,
        item: &CartItem,
        vendor_id: VendorId,
        vendor_name: &str,
    ) -> Result<Vec<CartEvent>, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity(item.quantity));
        }

        let mut events = Vec::with_capacity(2);
        let switching = self.vendor_id.is_some_and(|current| current != vendor_id);

        if self.vendor_id != Some(vendor_id) || self.vendor_name != vendor_name {
            events.push(CartEvent::VendorSelected(CartVendorSelected {
                vendor_id,
                vendor_name: vendor_name.to_string(),
                previous_vendor_id: self.vendor_id,
                discarded: if switching { self.items.clone() } else { Vec::new() },
            }));
        }

        // After a vendor switch the old lines are gone, so the item is new.
        let existing = if switching { None } else { self.find(item.menu_item_id) };

        match existing {
            Some(line) => {
                let new_quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CartError::QuantityOverflow(item.menu_item_id))?;

                events.push(CartEvent::QuantityIncreased(CartQuantityIncreased {
                    menu_item_id: item.menu_item_id,
                    added: item.quantity,
                    new_quantity,
                }));
            }
            None => {
                events.push(CartEvent::ItemAdded(CartItemAdded { item: item.clone() }));
            }
        }

        Ok(events)
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Cart {
    type Event = CartEvent;
    type Command = CartCommand;
    type Error = CartError;

    fn apply_event(&mut self, event: &Self::Event) {
        match event {
            CartEvent::VendorSelected(e) => {
                if self.vendor_id != Some(e.vendor_id) {
                    self.items.clear();
                }
                self.vendor_id = Some(e.vendor_id);
                self.vendor_name = e.vendor_name.clone();
            }
            CartEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
            }
            CartEvent::QuantityIncreased(e) => {
                if let Some(line) = self.find_mut(e.menu_item_id) {
                    line.quantity = e.new_quantity;
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.items.retain(|item| item.menu_item_id != e.item.menu_item_id);
            }
            CartEvent::Cleared => {
                *self = Self::default();
            }
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem { item, vendor_id, vendor_name } => {
                self.handle_add(item, *vendor_id, vendor_name)
            }

            CartCommand::RemoveItem { menu_item_id } => {
                // Removing an unknown key is a no-op
                Ok(self
                    .find(*menu_item_id)
                    .map(|item| CartEvent::ItemRemoved(CartItemRemoved { item: item.clone() }))
                    .into_iter()
                    .collect())
            }

            CartCommand::Clear => Ok(vec![CartEvent::Cleared]),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn burger(quantity: u32) -> CartItem {
        CartItem::new(1, "Burger", Decimal::new(6000, 2), quantity)
    }

    fn chips(quantity: u32) -> CartItem {
        CartItem::new(2, "Chips", Decimal::new(2500, 2), quantity)
    }

    fn add(cart: &mut Cart, item: CartItem, vendor: i64, name: &str) -> Vec<CartEvent> {
        cart.execute(&CartCommand::AddItem {
            item,
            vendor_id: VendorId(vendor),
            vendor_name: name.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.vendor_id(), None);
        assert_eq!(cart.vendor_name(), "");
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.total(), FLAT_DELIVERY_FEE);
    }

    #[test]
    fn test_adding_same_item_sums_quantities() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");
        let events = add(&mut cart, burger(1), 5, "Joe's");

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], CartEvent::QuantityIncreased(_)));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.subtotal(), Decimal::new(12000, 2));
        assert_eq!(cart.total(), Decimal::new(14500, 2));
    }

    #[test]
    fn test_unit_price_snapshot_is_kept_on_merge() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");

        let repriced = CartItem::new(1, "Burger", Decimal::new(9900, 2), 1);
        add(&mut cart, repriced, 5, "Joe's");

        assert_eq!(cart.items()[0].unit_price, Decimal::new(6000, 2));
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut cart = Cart::new();
        add(&mut cart, chips(1), 5, "Joe's");
        add(&mut cart, burger(2), 5, "Joe's");
        add(&mut cart, chips(3), 5, "Joe's");

        let ids: Vec<_> = cart.items().iter().map(|i| i.menu_item_id).collect();
        assert_eq!(ids, vec![MenuItemId(2), MenuItemId(1)]);
        assert_eq!(cart.quantity_of(MenuItemId(2)), 4);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_switching_vendor_discards_previous_items() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");
        add(&mut cart, chips(2), 5, "Joe's");

        let pizza = CartItem::new(1, "Pizza", Decimal::new(9000, 2), 1);
        let events = add(&mut cart, pizza.clone(), 9, "Luigi's");

        match &events[0] {
            CartEvent::VendorSelected(e) => {
                assert_eq!(e.previous_vendor_id, Some(VendorId(5)));
                assert_eq!(e.discarded.len(), 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        // Same menu id as the old burger, but it must not merge across vendors
        assert_eq!(cart.items(), &[pizza]);
        assert_eq!(cart.vendor_id(), Some(VendorId(9)));
        assert_eq!(cart.vendor_name(), "Luigi's");
    }

    #[test]
    fn test_removing_last_item_keeps_vendor() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");

        cart.execute(&CartCommand::RemoveItem { menu_item_id: MenuItemId(1) }).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.vendor_id(), Some(VendorId(5)));
        assert_eq!(cart.vendor_name(), "Joe's");
    }

    #[test]
    fn test_removing_unknown_item_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");
        let before = cart.clone();

        let events = cart
            .execute(&CartCommand::RemoveItem { menu_item_id: MenuItemId(77) })
            .unwrap();

        assert!(events.is_empty());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        add(&mut cart, burger(3), 5, "Joe's");

        cart.execute(&CartCommand::Clear).unwrap();

        assert_eq!(cart, Cart::default());
        assert_eq!(cart.vendor_id(), None);
        assert_eq!(cart.vendor_name(), "");
    }

    #[test]
    fn test_zero_quantity_is_rejected_without_change() {
        let mut cart = Cart::new();
        add(&mut cart, burger(1), 5, "Joe's");

        let result = cart.execute(&CartCommand::AddItem {
            item: chips(0),
            vendor_id: VendorId(9),
            vendor_name: "Luigi's".to_string(),
        });

        assert!(matches!(result, Err(CartError::InvalidQuantity(0))));
        assert_eq!(cart.vendor_id(), Some(VendorId(5)));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let mut cart = Cart::new();
        add(&mut cart, burger(u32::MAX), 5, "Joe's");

        let result = cart.execute(&CartCommand::AddItem {
            item: burger(1),
            vendor_id: VendorId(5),
            vendor_name: "Joe's".to_string(),
        });

        assert!(matches!(result, Err(CartError::QuantityOverflow(MenuItemId(1)))));
        assert_eq!(cart.quantity_of(MenuItemId(1)), u32::MAX);
    }

    #[test]
    fn test_to_order_request() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.to_order_request(CustomerId(3), "1 Main Rd", None),
            Err(CartError::Empty)
        ));

        add(&mut cart, burger(2), 5, "Joe's");
        let request = cart
            .to_order_request(CustomerId(3), "1 Main Rd", Some("No onions".to_string()))
            .unwrap();

        assert_eq!(request.vendor_id, VendorId(5));
        assert_eq!(request.vendor_name, "Joe's");
        assert_eq!(request.items, cart.items());
        assert_eq!(request.special_instructions.as_deref(), Some("No onions"));
    }

    proptest! {
        #[test]
        fn prop_single_vendor_adds_merge_by_menu_item(
            adds in prop::collection::vec((1i64..6, 1u32..10), 1..40)
        ) {
            let mut cart = Cart::new();
            let mut expected: Vec<(MenuItemId, u32)> = Vec::new();

            for (id, quantity) in &adds {
                let item = CartItem::new(*id, format!("item-{id}"), Decimal::new(1000 * id, 2), *quantity);
                add(&mut cart, item, 5, "Joe's");

                match expected.iter_mut().find(|(key, _)| *key == MenuItemId(*id)) {
                    Some((_, total)) => *total += quantity,
                    None => expected.push((MenuItemId(*id), *quantity)),
                }
            }

            let actual: Vec<(MenuItemId, u32)> = cart
                .items()
                .iter()
                .map(|item| (item.menu_item_id, item.quantity))
                .collect();
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(cart.vendor_id(), Some(VendorId(5)));
        }

        #[test]
        fn prop_clear_always_yields_initial_state(
            adds in prop::collection::vec((1i64..6, 1u32..10, 1i64..4), 0..20)
        ) {
            let mut cart = Cart::new();
            for (id, quantity, vendor) in &adds {
                let item = CartItem::new(*id, "x", Decimal::ONE, *quantity);
                add(&mut cart, item, *vendor, "v");
            }

            cart.execute(&CartCommand::Clear).unwrap();
            prop_assert_eq!(cart, Cart::default());
        }
    }
}
