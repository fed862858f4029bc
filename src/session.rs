use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutError, CheckoutHandler, CheckoutReceipt, CheckoutRequest};
use crate::config::CoreConfig;
use crate::domain::cart::CartStore;
use crate::domain::delivery::{Delivery, DeliveryCommandHandler, DeliveryError, DeliveryStats, DeliveryStatus};
use crate::domain::lifecycle::TransitionOutcome;
use crate::domain::order::{filter_by_status, Order, OrderCommandHandler, OrderError, OrderStatus};
use crate::domain::shared::{CourierId, CustomerId, DeliveryId, OrderId, UserId, VendorId};
use crate::metrics::Metrics;
use crate::services::{DispatchService, OrderService, PaymentService, ServiceError};

// ============================================================================
// Sessions - one signed-in user and what their role may do
// ============================================================================
//
// The role is resolved once at sign-in into a closed `Actor` variant. Order
// advancement exists only on `OwnerSession`, delivery advancement only on
// `CourierSession`. A customer session owns its cart from sign-in to logout.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    #[serde(rename = "RESTAURANT_OWNER", alias = "VENDOR_OWNER")]
    VendorOwner,
    #[serde(rename = "DELIVERY_DRIVER", alias = "COURIER")]
    Courier,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
}

/// Collaborators shared by every session
#[derive(Clone)]
pub struct Services {
    pub orders: Arc<dyn OrderService>,
    pub payments: Arc<dyn PaymentService>,
    pub dispatch: Arc<dyn DispatchService>,
    pub config: CoreConfig,
    pub metrics: Arc<Metrics>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Role {0:?} has no session in this client")]
    UnsupportedRole(Role),

    #[error("User {0} owns no restaurant")]
    NoVendor(UserId),

    #[error("Order {order_id} does not belong to vendor {vendor_id}")]
    ForeignOrder { order_id: OrderId, vendor_id: VendorId },

    #[error("Delivery {delivery_id} is not assigned to courier {courier_id}")]
    ForeignDelivery { delivery_id: DeliveryId, courier_id: CourierId },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub enum Actor {
    Customer(CustomerSession),
    VendorOwner(OwnerSession),
    Courier(CourierSession),
}

impl Actor {
    pub fn as_customer(&self) -> Option<&CustomerSession> {
        match self {
            Actor::Customer(session) => Some(session),
            _ => None,
        }
    }

    pub fn as_customer_mut(&mut self) -> Option<&mut CustomerSession> {
        match self {
            Actor::Customer(session) => Some(session),
            _ => None,
        }
    }

    pub fn as_owner(&self) -> Option<&OwnerSession> {
        match self {
            Actor::VendorOwner(session) => Some(session),
            _ => None,
        }
    }

    pub fn as_courier(&self) -> Option<&CourierSession> {
        match self {
            Actor::Courier(session) => Some(session),
            _ => None,
        }
    }
}

pub struct Session {
    user: UserProfile,
    actor: Actor,
}

impl Session {
    /// Sign a user in. A restaurant owner must name the vendor they run.
    pub fn start(user: UserProfile, vendor_id: Option<VendorId>, services: &Services) -> Result<Self, SessionError> {
        let actor = match user.role {
            Role::Customer => Actor::Customer(CustomerSession {
                customer_id: CustomerId(user.user_id.0),
                cart: CartStore::new(),
                orders: services.orders.clone(),
                checkout: CheckoutHandler::new(
                    services.orders.clone(),
                    services.payments.clone(),
                    services.config.clone(),
                    services.metrics.clone(),
                ),
            }),
            Role::VendorOwner => {
                let vendor_id = vendor_id.ok_or(SessionError::NoVendor(user.user_id))?;
                Actor::VendorOwner(OwnerSession {
                    vendor_id,
                    orders: services.orders.clone(),
                    handler: OrderCommandHandler::new(services.orders.clone(), services.metrics.clone()),
                })
            }
            Role::Courier => Actor::Courier(CourierSession {
                courier_id: CourierId(user.user_id.0),
                dispatch: services.dispatch.clone(),
                handler: DeliveryCommandHandler::new(services.dispatch.clone(), services.metrics.clone()),
            }),
            Role::Admin => return Err(SessionError::UnsupportedRole(Role::Admin)),
        };

        tracing::info!(user_id = %user.user_id, role = ?user.role, "Session started");
        Ok(Self { user, actor })
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    /// End the session, discarding any cart it held
    pub fn logout(self) {
        match self.actor {
            Actor::Customer(customer) => customer.logout(),
            _ => tracing::info!(user_id = %self.user.user_id, "Session ended"),
        }
    }
}

// ============================================================================
// Customer
// ============================================================================

pub struct CustomerSession {
    customer_id: CustomerId,
    cart: CartStore,
    orders: Arc<dyn OrderService>,
    checkout: CheckoutHandler,
}

impl CustomerSession {
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub async fn checkout(
        &mut self,
        delivery_address: impl Into<String>,
        special_instructions: Option<String>,
        payment_method: impl Into<String>,
    ) -> Result<CheckoutReceipt, SessionError> {
        let request = CheckoutRequest {
            customer_id: self.customer_id,
            delivery_address: delivery_address.into(),
            special_instructions,
            payment_method: payment_method.into(),
        };
        Ok(self.checkout.checkout(&mut self.cart, request).await?)
    }

    /// Newest first
    pub async fn my_orders(&self) -> Result<Vec<Order>, SessionError> {
        Ok(self.orders.list_by_customer(self.customer_id).await?)
    }

    pub fn logout(self) {
        tracing::info!(
            customer_id = %self.customer_id,
            cart_id = %self.cart.cart_id(),
            discarded_items = self.cart.cart().item_count(),
            "Customer logged out, cart discarded"
        );
    }
}

// ============================================================================
// Restaurant owner
// ============================================================================

pub struct OwnerSession {
    vendor_id: VendorId,
    orders: Arc<dyn OrderService>,
    handler: OrderCommandHandler,
}

impl OwnerSession {
    pub fn vendor_id(&self) -> VendorId {
        self.vendor_id
    }

    /// Orders for this vendor, optionally narrowed to one status
    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, SessionError> {
        let orders = self.orders.list_by_vendor(self.vendor_id).await?;
        Ok(filter_by_status(&orders, status).into_iter().cloned().collect())
    }

    pub async fn advance_order(&self, order: &mut Order) -> Result<TransitionOutcome<OrderStatus>, SessionError> {
        self.check_owned(order)?;
        Ok(self.handler.advance(order).await?)
    }

    pub async fn set_order_status(
        &self,
        order: &mut Order,
        status: OrderStatus,
    ) -> Result<TransitionOutcome<OrderStatus>, SessionError> {
        self.check_owned(order)?;
        Ok(self.handler.transition_to(order, status).await?)
    }

    pub async fn cancel_order(&self, order: &mut Order) -> Result<TransitionOutcome<OrderStatus>, SessionError> {
        self.check_owned(order)?;
        Ok(self.handler.cancel(order).await?)
    }

    fn check_owned(&self, order: &Order) -> Result<(), SessionError> {
        if order.vendor_id != self.vendor_id {
            tracing::warn!(order_id = %order.id, vendor_id = %self.vendor_id, "Owner touched another vendor's order");
            return Err(SessionError::ForeignOrder { order_id: order.id, vendor_id: self.vendor_id });
        }
        Ok(())
    }
}

// ============================================================================
// Courier
// ============================================================================

pub struct CourierSession {
    courier_id: CourierId,
    dispatch: Arc<dyn DispatchService>,
    handler: DeliveryCommandHandler,
}

impl CourierSession {
    pub fn courier_id(&self) -> CourierId {
        self.courier_id
    }

    pub async fn deliveries(&self, active_only: bool) -> Result<Vec<Delivery>, SessionError> {
        let deliveries = self.dispatch.list_by_courier(self.courier_id).await?;
        Ok(deliveries
            .into_iter()
            .filter(|delivery| !active_only || delivery.status.is_active())
            .collect())
    }

    pub async fn stats(&self) -> Result<DeliveryStats, SessionError> {
        let deliveries = self.dispatch.list_by_courier(self.courier_id).await?;
        Ok(DeliveryStats::from_deliveries(&deliveries))
    }

    pub async fn advance_delivery(
        &self,
        delivery: &mut Delivery,
        current_location: Option<String>,
    ) -> Result<TransitionOutcome<DeliveryStatus>, SessionError> {
        self.check_assigned(delivery)?;
        Ok(self.handler.advance(delivery, current_location).await?)
    }

    pub async fn fail_delivery(&self, delivery: &mut Delivery) -> Result<TransitionOutcome<DeliveryStatus>, SessionError> {
        self.check_assigned(delivery)?;
        Ok(self.handler.fail(delivery).await?)
    }

    fn check_assigned(&self, delivery: &Delivery) -> Result<(), SessionError> {
        if delivery.courier_id != self.courier_id {
            return Err(SessionError::ForeignDelivery {
                delivery_id: delivery.id,
                courier_id: self.courier_id,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
