// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic aggregate/event abstractions shared by the domain.
// Domain-specific code is in src/domain/
//
// ============================================================================

mod core;

pub use self::core::*;
