// ============================================================================
// External Collaborators
// ============================================================================
//
// Ports to the services that own the authoritative state (Order Service,
// Payment, Dispatch) plus in-memory adapters used by the demo and tests.
// HTTP transport is out of scope here; a REST adapter implements the same
// traits.
//
// ============================================================================

mod errors;
mod payment;
mod ports;
mod in_memory;

pub use errors::ServiceError;
pub use payment::{PaymentReceipt, PaymentRequest, PaymentStatus};
pub use ports::{AssignDeliveryRequest, DispatchService, OrderService, PaymentService};
pub use in_memory::{InMemoryDispatchService, InMemoryOrderService, InMemoryPaymentService};
