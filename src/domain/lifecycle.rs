use std::fmt::Debug;

// ============================================================================
// Lifecycle - shared shape of the order and delivery status machines
// ============================================================================
//
// Each status enum provides its single forward successor and its absorbing
// failure state through exhaustive matches. Legality checks are derived here
// so both machines answer the same questions the same way.
//
// ============================================================================

pub trait LifecycleStatus: Copy + Eq + Debug {
    /// The one legal forward successor, `None` for terminal states
    fn next(self) -> Option<Self>;

    /// Absorbing state reachable from any non-terminal state
    fn absorbing() -> Self;

    fn is_terminal(self) -> bool;

    /// Forward one step, or into the absorbing state, from a non-terminal status
    fn can_transition_to(self, target: Self) -> bool {
        !self.is_terminal() && (self.next() == Some(target) || target == Self::absorbing())
    }
}

/// Result of a transition request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome<S> {
    /// The authoritative store accepted the change; `to` is what it returned
    Applied { from: S, to: S },
    /// The target equals the current status; nothing was sent
    Unchanged(S),
    /// Current status is terminal; no action exists
    AlreadyTerminal(S),
}

impl<S: Copy> TransitionOutcome<S> {
    pub fn status(&self) -> S {
        match *self {
            TransitionOutcome::Applied { to, .. } => to,
            TransitionOutcome::Unchanged(s) | TransitionOutcome::AlreadyTerminal(s) => s,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }
}

/// What to do with a requested target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan<S> {
    Request(S),
    Skip(TransitionOutcome<S>),
    Reject { from: S, to: S },
}

/// Decide how a transition from `current` to `target` should be handled.
///
/// Terminal states win over everything else, then same-status retries,
/// then the legality table.
pub fn plan_transition<S: LifecycleStatus>(current: S, target: S) -> TransitionPlan<S> {
    if current.is_terminal() {
        return TransitionPlan::Skip(TransitionOutcome::AlreadyTerminal(current));
    }
    if current == target {
        return TransitionPlan::Skip(TransitionOutcome::Unchanged(current));
    }
    if current.can_transition_to(target) {
        TransitionPlan::Request(target)
    } else {
        TransitionPlan::Reject { from: current, to: target }
    }
}

/// Plan a single forward step
pub fn plan_advance<S: LifecycleStatus>(current: S) -> TransitionPlan<S> {
    match current.next() {
        Some(next) => TransitionPlan::Request(next),
        None => TransitionPlan::Skip(TransitionOutcome::AlreadyTerminal(current)),
    }
}
