use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cart::{CartItem, PlaceOrderRequest};
use crate::domain::lifecycle::LifecycleStatus;
use crate::domain::shared::{CustomerId, MenuItemId, Money, OrderId, VendorId, FLAT_DELIVERY_FEE};

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label for status chips
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl LifecycleStatus for OrderStatus {
    fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    fn absorbing() -> Self {
        OrderStatus::Cancelled
    }

    fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a cart line at order-creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: MenuItemId,
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub subtotal: Money,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id,
            item_name: item.item_name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            subtotal: item.line_total(),
        }
    }
}

/// Canonical, server-issued order. Only `status` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    #[serde(alias = "restaurantId")]
    pub vendor_id: VendorId,
    #[serde(alias = "restaurantName")]
    pub vendor_name: String,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total_amount: Money,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a PENDING order from a checkout request the way the Order
    /// Service prices it: line subtotals, flat fee, total.
    pub fn place(id: OrderId, request: &PlaceOrderRequest, created_at: DateTime<Utc>) -> Self {
        let items: Vec<OrderItem> = request.items.iter().map(OrderItem::from).collect();
        let subtotal: Money = items.iter().map(|item| item.subtotal).sum();

        Self {
            id,
            customer_id: request.customer_id,
            vendor_id: request.vendor_id,
            vendor_name: request.vendor_name.clone(),
            delivery_address: request.delivery_address.clone(),
            status: OrderStatus::Pending,
            items,
            subtotal,
            delivery_fee: FLAT_DELIVERY_FEE,
            total_amount: subtotal + FLAT_DELIVERY_FEE,
            special_instructions: request.special_instructions.clone(),
            created_at,
        }
    }

    /// Status the owner can move this order to next, if any
    pub fn next_status(&self) -> Option<OrderStatus> {
        self.status.next()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A delivery may only be created once the kitchen is done
    pub fn is_dispatch_eligible(&self) -> bool {
        matches!(self.status, OrderStatus::Ready | OrderStatus::OutForDelivery)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_forward_chain_is_exact() {
        let mut chain = vec![OrderStatus::Pending];
        while let Some(next) = chain.last().unwrap().next() {
            chain.push(next);
        }

        assert_eq!(
            chain,
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

    #[test]
    fn test_terminal_states() {
        for status in OrderStatus::ALL {
            let terminal = matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled);
            assert_eq!(status.is_terminal(), terminal, "{status}");
            assert_eq!(status.next().is_none(), terminal, "{status}");
        }
    }

    #[test]
    fn test_only_adjacent_or_cancel_is_legal() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = !from.is_terminal()
                    && (from.next() == Some(to) || to == OrderStatus::Cancelled);
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");

        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_place_prices_the_order() {
        let request = PlaceOrderRequest {
            customer_id: CustomerId(3),
            vendor_id: VendorId(5),
            vendor_name: "Joe's".to_string(),
            delivery_address: "1 Main Rd".to_string(),
            special_instructions: None,
            items: vec![
                CartItem::new(1, "Burger", Decimal::new(6000, 2), 2),
                CartItem::new(2, "Chips", Decimal::new(2550, 2), 1),
            ],
        };

        let order = Order::place(OrderId(1), &request, Utc::now());

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].subtotal, Decimal::new(12000, 2));
        assert_eq!(order.subtotal, Decimal::new(14550, 2));
        assert_eq!(order.delivery_fee, FLAT_DELIVERY_FEE);
        assert_eq!(order.total_amount, Decimal::new(17050, 2));
    }

    #[test]
    fn test_order_accepts_restaurant_field_names() {
        let json = r#"{
            "id": 12,
            "customerId": 3,
            "restaurantId": 5,
            "restaurantName": "Joe's",
            "deliveryAddress": "1 Main Rd",
            "status": "READY",
            "items": [{
                "menuItemId": 1,
                "itemName": "Burger",
                "unitPrice": "60.00",
                "quantity": 2,
                "subtotal": "120.00"
            }],
            "subtotal": "120.00",
            "deliveryFee": "25.00",
            "totalAmount": "145.00",
            "specialInstructions": null,
            "createdAt": "2026-01-05T12:00:00Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.vendor_id, VendorId(5));
        assert_eq!(order.status, OrderStatus::Ready);
        assert!(order.is_dispatch_eligible());
        assert_eq!(order.next_status(), Some(OrderStatus::OutForDelivery));
        assert_eq!(order.total_amount, Decimal::new(14500, 2));
    }
}
