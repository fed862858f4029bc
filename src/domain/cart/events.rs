use serde::{Deserialize, Serialize};

use crate::domain::shared::{MenuItemId, VendorId};
use crate::event_sourcing::DomainEvent;
use super::value_objects::CartItem;

// ============================================================================
// Cart Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    VendorSelected(CartVendorSelected),
    ItemAdded(CartItemAdded),
    QuantityIncreased(CartQuantityIncreased),
    ItemRemoved(CartItemRemoved),
    Cleared,
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::VendorSelected(_) => "CartVendorSelected",
            CartEvent::ItemAdded(_) => "CartItemAdded",
            CartEvent::QuantityIncreased(_) => "CartQuantityIncreased",
            CartEvent::ItemRemoved(_) => "CartItemRemoved",
            CartEvent::Cleared => "CartCleared",
        }
    }
}

/// The cart is now bound to this vendor. Items are dropped whenever the
/// vendor id changes; `discarded` records what was lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartVendorSelected {
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub previous_vendor_id: Option<VendorId>,
    pub discarded: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemAdded {
    pub item: CartItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuantityIncreased {
    pub menu_item_id: MenuItemId,
    pub added: u32,
    pub new_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRemoved {
    pub item: CartItem,
}
