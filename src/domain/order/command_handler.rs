use std::sync::Arc;

use crate::domain::lifecycle::{plan_advance, plan_transition, LifecycleStatus, TransitionOutcome, TransitionPlan};
use crate::metrics::Metrics;
use crate::services::OrderService;

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{Order, OrderStatus};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → legality check → Order Service → adopt response
//
// The local order is only ever replaced by what the Order Service accepted.
// A failed request leaves it exactly as it was. The handler checks legality
// only; who may call it is decided by the session layer.
//
// ============================================================================

pub struct OrderCommandHandler {
    orders: Arc<dyn OrderService>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(orders: Arc<dyn OrderService>, metrics: Arc<Metrics>) -> Self {
        Self { orders, metrics }
    }

    pub async fn handle(
        &self,
        order: &mut Order,
        command: OrderCommand,
    ) -> Result<TransitionOutcome<OrderStatus>, OrderError> {
        let plan = match command {
            OrderCommand::Advance => plan_advance(order.status),
            OrderCommand::TransitionTo(target) => plan_transition(order.status, target),
            OrderCommand::Cancel => plan_transition(order.status, OrderStatus::absorbing()),
        };

        let target = match plan {
            TransitionPlan::Request(target) => target,
            TransitionPlan::Skip(outcome) => {
                tracing::debug!(
                    order_id = %order.id,
                    status = %order.status,
                    outcome = ?outcome,
                    "No order transition to request"
                );
                return Ok(outcome);
            }
            TransitionPlan::Reject { from, to } => {
                tracing::warn!(order_id = %order.id, %from, %to, "Rejected illegal order transition");
                self.metrics.record_rejected("order", "invalid_transition");
                return Err(OrderError::InvalidTransition { from, to });
            }
        };

        let accepted = match self.orders.request_order_status(order.id, target).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id,
                    status = %order.status,
                    requested = %target,
                    error = %e,
                    "Order service did not apply transition"
                );
                self.metrics.record_rejected("order", "upstream");
                return Err(OrderError::Upstream(e));
            }
        };

        if accepted.id != order.id {
            self.metrics.record_rejected("order", "unexpected_order");
            return Err(OrderError::UnexpectedOrder {
                requested: order.id,
                returned: accepted.id,
            });
        }

        if accepted.status != target {
            // Another writer got there first; the store's answer wins.
            tracing::info!(
                order_id = %order.id,
                requested = %target,
                accepted = %accepted.status,
                "Order service returned a different status than requested"
            );
        }

        let from = order.status;
        *order = accepted;
        self.metrics.record_transition("order", order.status.as_str());

        tracing::info!(order_id = %order.id, %from, to = %order.status, "Order status updated");

        Ok(TransitionOutcome::Applied { from, to: order.status })
    }

    pub async fn advance(&self, order: &mut Order) -> Result<TransitionOutcome<OrderStatus>, OrderError> {
        self.handle(order, OrderCommand::Advance).await
    }

    pub async fn transition_to(
        &self,
        order: &mut Order,
        target: OrderStatus,
    ) -> Result<TransitionOutcome<OrderStatus>, OrderError> {
        self.handle(order, OrderCommand::TransitionTo(target)).await
    }

    pub async fn cancel(&self, order: &mut Order) -> Result<TransitionOutcome<OrderStatus>, OrderError> {
        self.handle(order, OrderCommand::Cancel).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{CartItem, PlaceOrderRequest};
    use crate::domain::shared::{CustomerId, OrderId, VendorId};
    use crate::services::{InMemoryOrderService, ServiceError};
    use rust_decimal::Decimal;

    async fn setup() -> (Arc<InMemoryOrderService>, OrderCommandHandler, Order) {
        let service = Arc::new(InMemoryOrderService::new());
        let order = service
            .place_order(PlaceOrderRequest {
                customer_id: CustomerId(3),
                vendor_id: VendorId(5),
                vendor_name: "Joe's".to_string(),
                delivery_address: "1 Main Rd".to_string(),
                special_instructions: None,
                items: vec![CartItem::new(1, "Burger", Decimal::new(6000, 2), 1)],
            })
            .await
            .unwrap();

        let handler = OrderCommandHandler::new(service.clone(), Arc::new(Metrics::new().unwrap()));
        (service, handler, order)
    }

    async fn walk_to(handler: &OrderCommandHandler, order: &mut Order, status: OrderStatus) {
        while order.status != status {
            handler.advance(order).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_advance_walks_the_full_chain() {
        let (_, handler, mut order) = setup().await;

        let mut seen = vec![order.status];
        while !order.is_terminal() {
            let outcome = handler.advance(&mut order).await.unwrap();
            assert!(outcome.is_applied());
            seen.push(order.status);
        }

        assert_eq!(
            seen,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered,
            ]
        );
    }

    #[tokio::test]
    async fn test_ready_to_delivered_then_noop() {
        let (_, handler, mut order) = setup().await;
        walk_to(&handler, &mut order, OrderStatus::Ready).await;

        handler.advance(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);

        handler.advance(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        let outcome = handler.advance(&mut order).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::AlreadyTerminal(OrderStatus::Delivered));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_advance_on_cancelled_is_noop() {
        let (service, handler, mut order) = setup().await;
        handler.cancel(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        service.fail_next(ServiceError::Unavailable("should not be called".into())).await;
        let outcome = handler.advance(&mut order).await.unwrap();

        assert_eq!(outcome, TransitionOutcome::AlreadyTerminal(OrderStatus::Cancelled));
        // The injected failure is still queued because no request was sent
        assert!(service.get_order(order.id).await.is_err());
    }

    #[tokio::test]
    async fn test_skipping_a_step_is_rejected() {
        let (service, handler, mut order) = setup().await;

        let result = handler.transition_to(&mut order, OrderStatus::Ready).await;

        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition { from: OrderStatus::Pending, to: OrderStatus::Ready })
        ));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(service.get_order(order.id).await.unwrap().status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_backwards_transition_is_rejected() {
        let (_, handler, mut order) = setup().await;
        walk_to(&handler, &mut order, OrderStatus::Preparing).await;

        let result = handler.transition_to(&mut order, OrderStatus::Confirmed).await;
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_explicit_target_to_same_status_is_unchanged() {
        let (_, handler, mut order) = setup().await;

        let outcome = handler.transition_to(&mut order, OrderStatus::Pending).await.unwrap();
        assert_eq!(outcome, TransitionOutcome::Unchanged(OrderStatus::Pending));
    }

    #[tokio::test]
    async fn test_cancel_from_any_non_terminal_state() {
        for stop in [OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::OutForDelivery] {
            let (_, handler, mut order) = setup().await;
            walk_to(&handler, &mut order, stop).await;

            let outcome = handler.cancel(&mut order).await.unwrap();
            assert_eq!(outcome, TransitionOutcome::Applied { from: stop, to: OrderStatus::Cancelled });
        }
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_order_untouched() {
        let (service, handler, mut order) = setup().await;
        let before = order.clone();

        service.fail_next(ServiceError::Timeout).await;
        let result = handler.advance(&mut order).await;

        assert!(matches!(result, Err(OrderError::Upstream(ServiceError::Timeout))));
        assert_eq!(order, before);

        // A retry by the actor goes through normally
        handler.advance(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_stale_local_status_is_kept_when_store_rejects() {
        let (service, handler, mut order) = setup().await;

        // Someone else already confirmed and started preparing the order
        service.force_status(order.id, OrderStatus::Confirmed).await;

        let outcome = handler.advance(&mut order).await;
        // PENDING -> CONFIRMED is illegal in the store now, so nothing changes
        assert!(matches!(outcome, Err(OrderError::Upstream(ServiceError::Rejected(_)))));
        assert_eq!(order.status, OrderStatus::Pending);

        let fresh = service.get_order(order.id).await.unwrap();
        let mut order = fresh;
        handler.advance(&mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    /// Store where a concurrent cancel always lands before the requested change
    struct CancelledMeanwhile(Arc<InMemoryOrderService>);

    #[async_trait::async_trait]
    impl OrderService for CancelledMeanwhile {
        async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, ServiceError> {
            self.0.place_order(request).await
        }
        async fn request_order_status(&self, order_id: OrderId, _: OrderStatus) -> Result<Order, ServiceError> {
            self.0.request_order_status(order_id, OrderStatus::Cancelled).await
        }
        async fn get_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
            self.0.get_order(order_id).await
        }
        async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, ServiceError> {
            self.0.list_by_customer(customer_id).await
        }
        async fn list_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Order>, ServiceError> {
            self.0.list_by_vendor(vendor_id).await
        }
    }

    #[tokio::test]
    async fn test_store_answer_is_adopted_over_requested_status() {
        let (service, _, mut order) = setup().await;
        let handler = OrderCommandHandler::new(
            Arc::new(CancelledMeanwhile(service.clone())),
            Arc::new(Metrics::new().unwrap()),
        );

        let outcome = handler.advance(&mut order).await.unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::Applied { from: OrderStatus::Pending, to: OrderStatus::Cancelled }
        );
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order, service.get_order(order.id).await.unwrap());
    }
}
