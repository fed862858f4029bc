use super::value_objects::DeliveryStatus;

// ============================================================================
// Delivery Commands - courier-driven status changes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryCommand {
    Advance {
        current_location: Option<String>,
    },
    TransitionTo {
        status: DeliveryStatus,
        current_location: Option<String>,
    },
    Fail {
        current_location: Option<String>,
    },
}
