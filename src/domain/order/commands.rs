use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - status changes an actor may request
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderCommand {
    /// Move to the single legal successor of the current status
    Advance,
    /// Move to an explicitly chosen status (e.g. from a status picker)
    TransitionTo(OrderStatus),
    /// Enter the absorbing CANCELLED state
    Cancel,
}
