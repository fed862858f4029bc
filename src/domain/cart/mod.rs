// ============================================================================
// Cart Domain - the customer's single-vendor selection before checkout
// ============================================================================
//
// - Value objects (CartItem, PlaceOrderRequest)
// - Events (CartVendorSelected, CartItemAdded, ...)
// - Commands (AddItem, RemoveItem, Clear)
// - Errors (CartError enum)
// - Aggregate (Cart with the consistency rules)
// - Store (CartStore, the session-owned journaled cart)
//
// Nothing here depends on the order or delivery lifecycles.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod store;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use store::*;
