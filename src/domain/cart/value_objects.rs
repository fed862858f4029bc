use serde::{Deserialize, Serialize};

use crate::domain::shared::{CustomerId, MenuItemId, Money, VendorId};

// ============================================================================
// Cart Value Objects
// ============================================================================

/// One cart line. `unit_price` is the price seen when the item was added and
/// is never re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: MenuItemId,
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(
        menu_item_id: impl Into<MenuItemId>,
        item_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            item_name: item_name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * Money::from(self.quantity)
    }
}

/// Order-creation request handed to the Order Service at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_id: CustomerId,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub delivery_address: String,
    pub special_instructions: Option<String>,
    pub items: Vec<CartItem>,
}
