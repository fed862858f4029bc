use crate::domain::shared::OrderId;
use crate::services::ServiceError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Lifecycle Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Transition not applied: {0}")]
    Upstream(#[from] ServiceError),

    #[error("Order service answered for order {returned}, expected {requested}")]
    UnexpectedOrder { requested: OrderId, returned: OrderId },
}
