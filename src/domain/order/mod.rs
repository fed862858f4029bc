// ============================================================================
// Order Domain - canonical order record and its status lifecycle
// ============================================================================
//
// - Value objects (Order, OrderItem, OrderStatus)
// - Commands (Advance, TransitionTo, Cancel)
// - Errors (OrderError enum)
// - Command Handler (OrderCommandHandler, adopts Order Service answers)
// - Queries (status filtering for the owner view)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod command_handler;
pub mod queries;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
pub use queries::*;
