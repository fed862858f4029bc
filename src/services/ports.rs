use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cart::PlaceOrderRequest;
use crate::domain::delivery::{Delivery, DeliveryStatus};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared::{CourierId, CustomerId, DeliveryId, OrderId, VendorId};
use super::errors::ServiceError;
use super::payment::{PaymentReceipt, PaymentRequest};

/// Authoritative store for orders.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create a PENDING order from a cart snapshot. May reject stale prices
    /// or unavailable items.
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, ServiceError>;

    /// Ask the store to move an order to `status`; returns the order as stored.
    async fn request_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, ServiceError>;

    async fn get_order(&self, order_id: OrderId) -> Result<Order, ServiceError>;

    /// Newest first
    async fn list_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, ServiceError>;

    /// Newest first
    async fn list_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Order>, ServiceError>;
}

/// Payment gateway front, invoked once an order exists.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// A declined payment is `Ok` with a FAILED receipt; `Err` means the
    /// request itself did not go through.
    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, ServiceError>;

    /// Payment recorded for an order; `NotFound` when the gateway has none
    async fn get_by_order(&self, order_id: OrderId) -> Result<PaymentReceipt, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeliveryRequest {
    pub order_id: OrderId,
    pub courier_id: CourierId,
    pub courier_name: Option<String>,
    pub courier_phone: Option<String>,
    pub notes: Option<String>,
}

/// Authoritative store for deliveries. Decides when an order may be
/// dispatched.
#[async_trait]
pub trait DispatchService: Send + Sync {
    async fn assign_delivery(&self, request: AssignDeliveryRequest) -> Result<Delivery, ServiceError>;

    async fn request_delivery_status(
        &self,
        delivery_id: DeliveryId,
        status: DeliveryStatus,
        current_location: Option<String>,
    ) -> Result<Delivery, ServiceError>;

    async fn get_delivery(&self, delivery_id: DeliveryId) -> Result<Delivery, ServiceError>;

    async fn get_by_order(&self, order_id: OrderId) -> Result<Delivery, ServiceError>;

    /// Newest first
    async fn list_by_courier(&self, courier_id: CourierId) -> Result<Vec<Delivery>, ServiceError>;
}
