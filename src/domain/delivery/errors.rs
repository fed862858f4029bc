use crate::domain::shared::DeliveryId;
use crate::services::ServiceError;
use super::value_objects::DeliveryStatus;

// ============================================================================
// Delivery Lifecycle Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: DeliveryStatus, to: DeliveryStatus },

    #[error("Transition not applied: {0}")]
    Upstream(#[from] ServiceError),

    #[error("Dispatch service answered for delivery {returned}, expected {requested}")]
    UnexpectedDelivery { requested: DeliveryId, returned: DeliveryId },
}
