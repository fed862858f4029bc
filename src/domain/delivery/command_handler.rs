use std::sync::Arc;

use chrono::Utc;

use crate::domain::lifecycle::{plan_advance, plan_transition, LifecycleStatus, TransitionOutcome, TransitionPlan};
use crate::metrics::Metrics;
use crate::services::DispatchService;

use super::commands::DeliveryCommand;
use super::errors::DeliveryError;
use super::value_objects::{Delivery, DeliveryStatus};

// ============================================================================
// Delivery Command Handler
// ============================================================================
//
// Orchestrates: Command → legality check → Dispatch Service → adopt response
//
// Same contract as the order handler. Milestone timestamps (picked up,
// delivered) are write-once across adoption.
//
// ============================================================================

pub struct DeliveryCommandHandler {
    dispatch: Arc<dyn DispatchService>,
    metrics: Arc<Metrics>,
}

impl DeliveryCommandHandler {
    pub fn new(dispatch: Arc<dyn DispatchService>, metrics: Arc<Metrics>) -> Self {
        Self { dispatch, metrics }
    }

    pub async fn handle(
        &self,
        delivery: &mut Delivery,
        command: DeliveryCommand,
    ) -> Result<TransitionOutcome<DeliveryStatus>, DeliveryError> {
        let (plan, current_location) = match command {
            DeliveryCommand::Advance { current_location } => {
                (plan_advance(delivery.status), current_location)
            }
            DeliveryCommand::TransitionTo { status, current_location } => {
                (plan_transition(delivery.status, status), current_location)
            }
            DeliveryCommand::Fail { current_location } => {
                (plan_transition(delivery.status, DeliveryStatus::absorbing()), current_location)
            }
        };

        let target = match plan {
            TransitionPlan::Request(target) => target,
            TransitionPlan::Skip(outcome) => {
                tracing::debug!(
                    delivery_id = %delivery.id,
                    status = %delivery.status,
                    outcome = ?outcome,
                    "No delivery transition to request"
                );
                return Ok(outcome);
            }
            TransitionPlan::Reject { from, to } => {
                tracing::warn!(delivery_id = %delivery.id, %from, %to, "Rejected illegal delivery transition");
                self.metrics.record_rejected("delivery", "invalid_transition");
                return Err(DeliveryError::InvalidTransition { from, to });
            }
        };

        let accepted = match self
            .dispatch
            .request_delivery_status(delivery.id, target, current_location)
            .await
        {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(
                    delivery_id = %delivery.id,
                    status = %delivery.status,
                    requested = %target,
                    error = %e,
                    "Dispatch service did not apply transition"
                );
                self.metrics.record_rejected("delivery", "upstream");
                return Err(DeliveryError::Upstream(e));
            }
        };

        if accepted.id != delivery.id {
            self.metrics.record_rejected("delivery", "unexpected_delivery");
            return Err(DeliveryError::UnexpectedDelivery {
                requested: delivery.id,
                returned: accepted.id,
            });
        }

        let from = delivery.status;
        delivery.adopt(accepted);
        delivery.stamp_milestone(Utc::now());
        self.metrics.record_transition("delivery", delivery.status.as_str());

        tracing::info!(
            delivery_id = %delivery.id,
            order_id = %delivery.order_id,
            %from,
            to = %delivery.status,
            "Delivery status updated"
        );

        Ok(TransitionOutcome::Applied { from, to: delivery.status })
    }

    pub async fn advance(
        &self,
        delivery: &mut Delivery,
        current_location: Option<String>,
    ) -> Result<TransitionOutcome<DeliveryStatus>, DeliveryError> {
        self.handle(delivery, DeliveryCommand::Advance { current_location }).await
    }

    pub async fn transition_to(
        &self,
        delivery: &mut Delivery,
        status: DeliveryStatus,
    ) -> Result<TransitionOutcome<DeliveryStatus>, DeliveryError> {
        self.handle(delivery, DeliveryCommand::TransitionTo { status, current_location: None }).await
    }

    pub async fn fail(&self, delivery: &mut Delivery) -> Result<TransitionOutcome<DeliveryStatus>, DeliveryError> {
        self.handle(delivery, DeliveryCommand::Fail { current_location: None }).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
