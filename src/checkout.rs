use std::sync::Arc;

use crate::config::CoreConfig;
use crate::domain::cart::{CartError, CartStore};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared::{CustomerId, OrderId};
use crate::metrics::Metrics;
use crate::services::{OrderService, PaymentReceipt, PaymentRequest, PaymentService, ServiceError};
use crate::utils::retry_on_transient;

// ============================================================================
// Checkout - Cart → Order Service → Payment
// ============================================================================
//
// The cart is cleared only after the order exists AND its payment completed.
// Any earlier failure leaves the cart exactly as the customer built it.
//
// Payment policy: transient payment errors are retried with backoff. A failed
// call is reconciled against the gateway's record for the order, since a
// charge can succeed while its response is lost. Only when no completed
// payment exists is the new order cancelled (compensation). If the gateway
// cannot be asked, the order is left alone.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub delivery_address: String,
    pub special_instructions: Option<String>,
    pub payment_method: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub payment: PaymentReceipt,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Order was not created: {0}")]
    OrderRejected(#[source] ServiceError),

    #[error("Payment failed for order {order_id}: {reason}")]
    PaymentFailed {
        order_id: OrderId,
        reason: String,
        /// The order was cancelled after the failed payment
        compensated: bool,
    },

    /// The payment call failed and the gateway could not say whether a charge
    /// exists. The order is not cancelled and the cart is kept.
    #[error("Payment outcome unknown for order {order_id}: {reason}")]
    PaymentUnconfirmed { order_id: OrderId, reason: String },
}

pub struct CheckoutHandler {
    orders: Arc<dyn OrderService>,
    payments: Arc<dyn PaymentService>,
    config: CoreConfig,
    metrics: Arc<Metrics>,
}

impl CheckoutHandler {
    pub fn new(
        orders: Arc<dyn OrderService>,
        payments: Arc<dyn PaymentService>,
        config: CoreConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { orders, payments, config, metrics }
    }

    pub async fn checkout(
        &self,
        cart: &mut CartStore,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let order_request = cart.cart().to_order_request(
            request.customer_id,
            request.delivery_address,
            request.special_instructions,
        )?;

        tracing::info!(
            customer_id = %request.customer_id,
            vendor_id = %order_request.vendor_id,
            lines = order_request.items.len(),
            "Placing order"
        );

        let order = match self.orders.place_order(order_request).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(customer_id = %request.customer_id, error = %e, "Order service rejected checkout");
                self.metrics.record_checkout_failure("order");
                return Err(CheckoutError::OrderRejected(e));
            }
        };

        let payment_request = PaymentRequest {
            order_id: order.id,
            customer_id: order.customer_id,
            amount: order.total_amount,
            payment_method: request.payment_method,
        };

        let payments = self.payments.clone();
        let attempt = retry_on_transient(self.config.payment_retry.clone(), |attempt| {
            let payments = payments.clone();
            let payment_request = payment_request.clone();
            async move {
                tracing::debug!(order_id = %payment_request.order_id, attempt, "Submitting payment");
                payments.process_payment(payment_request).await
            }
        })
        .await
        .into_result();

        let receipt = match attempt {
            Ok(receipt) => receipt,
            // The charge may have gone through even though the answer was lost
            Err(error) => match self.payments.get_by_order(order.id).await {
                Ok(recorded) => {
                    tracing::info!(
                        order_id = %order.id,
                        error = %error,
                        status = ?recorded.status,
                        "Payment call failed but the gateway has a payment on record"
                    );
                    recorded
                }
                Err(ServiceError::NotFound(_)) => {
                    return Err(self.payment_failed(&order, error.to_string()).await);
                }
                Err(lookup) => {
                    tracing::error!(
                        order_id = %order.id,
                        error = %error,
                        lookup_error = %lookup,
                        "Payment outcome unknown, order left as is"
                    );
                    self.metrics.record_checkout_failure("payment_unconfirmed");
                    return Err(CheckoutError::PaymentUnconfirmed {
                        order_id: order.id,
                        reason: error.to_string(),
                    });
                }
            },
        };

        if !receipt.is_completed() {
            let reason = receipt
                .failure_reason
                .unwrap_or_else(|| format!("payment {:?}", receipt.status));
            return Err(self.payment_failed(&order, reason).await);
        }

        cart.clear()?;
        self.metrics.orders_placed.inc();
        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            reference = ?receipt.transaction_reference,
            "Checkout complete"
        );
        Ok(CheckoutReceipt { order, payment: receipt })
    }

    /// No completed payment exists for `order`: cancel it if configured.
    async fn payment_failed(&self, order: &Order, reason: String) -> CheckoutError {
        self.metrics.record_checkout_failure("payment");
        tracing::warn!(order_id = %order.id, reason = %reason, "Payment failed after order creation");

        let compensated = self.config.compensate_failed_payments && self.compensate(order).await;

        CheckoutError::PaymentFailed {
            order_id: order.id,
            reason,
            compensated,
        }
    }

    async fn compensate(&self, order: &Order) -> bool {
        match self.orders.request_order_status(order.id, OrderStatus::Cancelled).await {
            Ok(cancelled) => {
                self.metrics.payments_compensated.inc();
                self.metrics.record_transition("order", cancelled.status.as_str());
                tracing::info!(order_id = %order.id, "Unpaid order cancelled");
                true
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Could not cancel unpaid order");
                false
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
