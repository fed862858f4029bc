use crate::domain::shared::{MenuItemId, VendorId};
use super::value_objects::CartItem;

// ============================================================================
// Cart Commands - Represent customer intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum CartCommand {
    AddItem {
        item: CartItem,
        vendor_id: VendorId,
        vendor_name: String,
    },
    RemoveItem {
        menu_item_id: MenuItemId,
    },
    Clear,
}
