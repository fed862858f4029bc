use super::event::EventEnvelope;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. Commands are validated before emitting events
// 2. Events represent facts that have already happened
// 3. Applying an event can never fail
// 4. All state changes flow through events
//
// ============================================================================

/// Generic Aggregate trait - every event-driven aggregate implements this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Default + Sized {
    type Event: Clone;
    type Command;
    type Error;

    /// Apply an event to update state
    fn apply_event(&mut self, event: &Self::Event);

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Validate a command, then apply every resulting event in order.
    ///
    /// Nothing is applied when the command is rejected.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event);
        }
        Ok(events)
    }

    /// Rebuild an aggregate by replaying its event history on the initial state
    fn load_from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a EventEnvelope<Self::Event>>,
        Self::Event: 'a,
    {
        let mut aggregate = Self::default();
        for envelope in events {
            aggregate.apply_event(&envelope.event_data);
        }
        aggregate
    }
}
