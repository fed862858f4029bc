// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Cart, order and delivery models with their rules. Each area has its own
// subdirectory with value objects, commands, errors and a handler.
//
// This layer knows nothing about transport; external services are reached
// through the ports in `crate::services`.
//
// ============================================================================

pub mod shared;
pub mod lifecycle;
pub mod cart;
pub mod order;
pub mod delivery;
