use crate::domain::shared::MenuItemId;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Cart item quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("Quantity overflow for menu item {0}")]
    QuantityOverflow(MenuItemId),

    #[error("Cannot check out an empty cart")]
    Empty,
}
