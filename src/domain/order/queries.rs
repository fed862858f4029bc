use super::value_objects::{Order, OrderStatus};

/// Orders matching `status`, or all of them when no filter is selected.
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| status.map_or(true, |wanted| order.status == wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{CartItem, PlaceOrderRequest};
    use crate::domain::shared::{CustomerId, OrderId, VendorId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(id: i64, status: OrderStatus) -> Order {
        let request = PlaceOrderRequest {
            customer_id: CustomerId(1),
            vendor_id: VendorId(5),
            vendor_name: "Joe's".to_string(),
            delivery_address: "1 Main Rd".to_string(),
            special_instructions: None,
            items: vec![CartItem::new(1, "Burger", Decimal::new(6000, 2), 1)],
        };
        let mut order = Order::place(OrderId(id), &request, Utc::now());
        order.status = status;
        order
    }

    #[test]
    fn test_filter_by_status() {
        let orders = vec![
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::Ready),
            order(3, OrderStatus::Pending),
        ];

        let pending: Vec<_> = filter_by_status(&orders, Some(OrderStatus::Pending))
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(pending, vec![OrderId(1), OrderId(3)]);

        assert_eq!(filter_by_status(&orders, None).len(), 3);
        assert!(filter_by_status(&orders, Some(OrderStatus::Cancelled)).is_empty());
    }
}
