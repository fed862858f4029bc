// ============================================================================
// Delivery Domain - courier task and its status lifecycle
// ============================================================================
//
// - Value objects (Delivery, DeliveryStatus)
// - Commands (Advance, TransitionTo, Fail)
// - Errors (DeliveryError enum)
// - Command Handler (DeliveryCommandHandler, adopts dispatch answers)
// - Stats (courier dashboard counters)
//
// The delivery timeline is independent of the order timeline.
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod command_handler;
pub mod stats;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
pub use stats::*;
