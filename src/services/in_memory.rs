use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::cart::PlaceOrderRequest;
use crate::domain::delivery::{Delivery, DeliveryStatus};
use crate::domain::lifecycle::LifecycleStatus;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared::{CourierId, CustomerId, DeliveryId, OrderId, PaymentId, VendorId};
use super::errors::ServiceError;
use super::payment::{PaymentReceipt, PaymentRequest, PaymentStatus};
use super::ports::{AssignDeliveryRequest, DispatchService, OrderService, PaymentService};

// ============================================================================
// In-Memory Service Adapters
// ============================================================================
//
// Behave like the real services: they validate transitions themselves, own
// ids and timestamps, and can be told to fail the next call.
//
// ============================================================================

/// Queue of errors returned by the next calls, one per call
#[derive(Default)]
struct FaultQueue(Mutex<VecDeque<ServiceError>>);

impl FaultQueue {
    async fn push(&self, error: ServiceError) {
        self.0.lock().await.push_back(error);
    }

    async fn check(&self) -> Result<(), ServiceError> {
        match self.0.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Default)]
struct OrderState {
    orders: BTreeMap<OrderId, Order>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryOrderService {
    state: Mutex<OrderState>,
    faults: FaultQueue,
}

impl InMemoryOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`
    pub async fn fail_next(&self, error: ServiceError) {
        self.faults.push(error).await;
    }

    /// Overwrite a stored status without any checks, as another writer would
    pub async fn force_status(&self, order_id: OrderId, status: OrderStatus) {
        if let Some(order) = self.state.lock().await.orders.get_mut(&order_id) {
            order.status = status;
        }
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, ServiceError> {
        self.faults.check().await?;

        if request.items.is_empty() {
            return Err(ServiceError::Rejected("order has no items".to_string()));
        }

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let order = Order::place(OrderId(state.next_id), &request, Utc::now());
        state.orders.insert(order.id, order.clone());

        tracing::debug!(order_id = %order.id, total = %order.total_amount, "Order stored");
        Ok(order)
    }

    async fn request_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, ServiceError> {
        self.faults.check().await?;

        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))?;

        if !order.status.can_transition_to(status) {
            return Err(ServiceError::Rejected(format!(
                "Invalid status transition: {} -> {}",
                order.status, status
            )));
        }

        order.status = status;
        Ok(order.clone())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.faults.check().await?;

        self.state
            .lock()
            .await
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))
    }

    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, ServiceError> {
        self.faults.check().await?;

        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Order>, ServiceError> {
        self.faults.check().await?;

        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|order| order.vendor_id == vendor_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Default)]
struct PaymentState {
    payments: BTreeMap<OrderId, PaymentReceipt>,
    declines: VecDeque<String>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryPaymentService {
    state: Mutex<PaymentState>,
    faults: FaultQueue,
}

impl InMemoryPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_next(&self, error: ServiceError) {
        self.faults.push(error).await;
    }

    /// Decline the next payment with `reason`
    pub async fn decline_next(&self, reason: impl Into<String>) {
        self.state.lock().await.declines.push_back(reason.into());
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, ServiceError> {
        self.faults.check().await?;

        let mut state = self.state.lock().await;
        if state.payments.contains_key(&request.order_id) {
            return Err(ServiceError::Conflict(format!(
                "payment already exists for order {}",
                request.order_id
            )));
        }

        state.next_id += 1;
        let id = PaymentId(state.next_id);

        let receipt = match state.declines.pop_front() {
            Some(reason) => PaymentReceipt {
                id,
                order_id: request.order_id,
                amount: request.amount,
                status: PaymentStatus::Failed,
                transaction_reference: None,
                failure_reason: Some(reason),
            },
            None => {
                let reference = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
                PaymentReceipt {
                    id,
                    order_id: request.order_id,
                    amount: request.amount,
                    status: PaymentStatus::Completed,
                    transaction_reference: Some(format!("TXN-{reference}")),
                    failure_reason: None,
                }
            }
        };

        state.payments.insert(request.order_id, receipt.clone());
        Ok(receipt)
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<PaymentReceipt, ServiceError> {
        self.faults.check().await?;

        self.state
            .lock()
            .await
            .payments
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("payment for order {order_id}")))
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[derive(Default)]
struct DispatchState {
    deliveries: BTreeMap<DeliveryId, Delivery>,
    next_id: i64,
}

pub struct InMemoryDispatchService {
    orders: Arc<dyn OrderService>,
    state: Mutex<DispatchState>,
    faults: FaultQueue,
}

impl InMemoryDispatchService {
    pub fn new(orders: Arc<dyn OrderService>) -> Self {
        Self {
            orders,
            state: Mutex::new(DispatchState::default()),
            faults: FaultQueue::default(),
        }
    }

    pub async fn fail_next(&self, error: ServiceError) {
        self.faults.push(error).await;
    }
}

#[async_trait]
impl DispatchService for InMemoryDispatchService {
    async fn assign_delivery(&self, request: AssignDeliveryRequest) -> Result<Delivery, ServiceError> {
        self.faults.check().await?;

        let order = self.orders.get_order(request.order_id).await?;
        if !order.is_dispatch_eligible() {
            return Err(ServiceError::Rejected(format!(
                "order {} is {} and cannot be dispatched yet",
                order.id, order.status
            )));
        }

        let mut state = self.state.lock().await;
        if state.deliveries.values().any(|d| d.order_id == order.id) {
            return Err(ServiceError::Conflict(format!(
                "delivery already assigned for order {}",
                order.id
            )));
        }

        state.next_id += 1;
        let delivery = Delivery {
            id: DeliveryId(state.next_id),
            order_id: order.id,
            courier_id: request.courier_id,
            courier_name: request.courier_name,
            courier_phone: request.courier_phone,
            delivery_address: order.delivery_address,
            status: DeliveryStatus::Assigned,
            current_location: None,
            notes: request.notes,
            picked_up_at: None,
            delivered_at: None,
            created_at: Utc::now(),
        };
        state.deliveries.insert(delivery.id, delivery.clone());

        tracing::debug!(
            delivery_id = %delivery.id,
            order_id = %delivery.order_id,
            courier_id = %delivery.courier_id,
            "Delivery assigned"
        );
        Ok(delivery)
    }

    async fn request_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        current_location: Option<String>,
    ) -> Result<Delivery, ServiceError> {
        self.faults.check().await?;

        let mut state = self.state.lock().await;
        let delivery = state
            .deliveries
            .get_mut(&delivery_id)
            .ok_or_else(|| ServiceError::NotFound(format!("delivery {delivery_id}")))?;

        if !delivery.status.can_transition_to(status) {
            return Err(ServiceError::Rejected(format!(
                "Invalid status transition: {} -> {}",
                delivery.status, status
            )));
        }

        delivery.status = status;
        if current_location.is_some() {
            delivery.current_location = current_location;
        }
        delivery.stamp_milestone(Utc::now());

        Ok(delivery.clone())
    }

    async fn get_delivery(&self, delivery_id: DeliveryId) -> Result<Delivery, ServiceError> {
        self.faults.check().await?;

        self.state
            .lock()
            .await
            .deliveries
            .get(&delivery_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("delivery {delivery_id}")))
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<Delivery, ServiceError> {
        self.faults.check().await?;

        self.state
            .lock()
            .await
            .deliveries
            .values()
            .find(|d| d.order_id == order_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("delivery for order {order_id}")))
    }

    async fn list_by_courier(&self, courier_id: CourierId) -> Result<Vec<Delivery>, ServiceError> {
        self.faults.check().await?;

        let state = self.state.lock().await;
        Ok(state
            .deliveries
            .values()
            .rev()
            .filter(|d| d.courier_id == courier_id)
            .cloned()
            .collect())
    }
}
