use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use food_order_core::domain::cart::CartItem;
use food_order_core::domain::delivery::DeliveryStatus;
use food_order_core::domain::order::OrderStatus;
use food_order_core::domain::shared::{CourierId, UserId, VendorId};
use food_order_core::metrics::Metrics;
use food_order_core::services::{
    AssignDeliveryRequest, DispatchService, InMemoryDispatchService, InMemoryOrderService,
    InMemoryPaymentService, OrderService,
};
use food_order_core::config::DEFAULT_LOG_FILTER;
use food_order_core::{CoreConfig, Role, Services, Session, UserProfile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize structured logging with environment-based filtering
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    // After logging is up so invalid settings are reported
    let config = CoreConfig::from_env();

    tracing::info!("Starting food ordering demo");

    // === 1. Collaborators ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    let orders = Arc::new(InMemoryOrderService::new());
    let dispatch = Arc::new(InMemoryDispatchService::new(orders.clone()));
    let services = Services {
        orders: orders.clone(),
        payments: Arc::new(InMemoryPaymentService::new()),
        dispatch: dispatch.clone(),
        config,
        metrics: metrics.clone(),
    };

    // === 2. Customer fills a cart and checks out ===
    let mut customer_session = Session::start(profile(3, "Thandi", Role::Customer), None, &services)?;
    let customer = customer_session
        .actor_mut()
        .as_customer_mut()
        .ok_or_else(|| anyhow::anyhow!("customer session expected"))?;

    let cart = customer.cart_mut();
    cart.add_item(CartItem::new(11, "Pap & Wors", Decimal::new(8500, 2), 1), VendorId(1), "Mama's Kitchen")?;
    // Switching vendor discards the first cart
    cart.add_item(CartItem::new(21, "Bunny Chow", Decimal::new(6000, 2), 1), VendorId(2), "Durban Spice")?;
    cart.add_item(CartItem::new(21, "Bunny Chow", Decimal::new(6000, 2), 1), VendorId(2), "Durban Spice")?;
    cart.add_item(CartItem::new(22, "Samoosas", Decimal::new(2500, 2), 3), VendorId(2), "Durban Spice")?;

    tracing::info!(
        vendor = customer.cart().cart().vendor_name(),
        items = customer.cart().cart().item_count(),
        total = %customer.cart().cart().total(),
        "Cart ready"
    );

    let receipt = customer
        .checkout("12 Long St, Cape Town", Some("No onions".to_string()), "CARD")
        .await?;
    let order_id = receipt.order.id;
    tracing::info!(
        %order_id,
        total = %receipt.order.total_amount,
        reference = ?receipt.payment.transaction_reference,
        "Order placed and paid"
    );
    customer_session.logout();

    // === 3. Restaurant owner works the order ===
    let owner_session = Session::start(profile(2, "Ravi", Role::VendorOwner), Some(VendorId(2)), &services)?;
    let owner = owner_session
        .actor()
        .as_owner()
        .ok_or_else(|| anyhow::anyhow!("owner session expected"))?;

    let mut order = orders.get_order(order_id).await?;
    while order.status != OrderStatus::Ready {
        owner.advance_order(&mut order).await?;
    }

    // === 4. Dispatch and courier ===
    let mut delivery = dispatch
        .assign_delivery(AssignDeliveryRequest {
            order_id,
            courier_id: CourierId(7),
            courier_name: Some("Sipho".to_string()),
            courier_phone: Some("+27 82 555 0101".to_string()),
            notes: None,
        })
        .await?;

    let courier_session = Session::start(profile(7, "Sipho", Role::Courier), None, &services)?;
    let courier = courier_session
        .actor()
        .as_courier()
        .ok_or_else(|| anyhow::anyhow!("courier session expected"))?;

    while let Some(next) = delivery.next_status() {
        if next == DeliveryStatus::PickedUp {
            owner.advance_order(&mut order).await?;
        }
        courier.advance_delivery(&mut delivery, Some("N2 highway".to_string())).await?;
        tracing::info!(
            status = %delivery.status,
            next_action = ?delivery.status.action_label(),
            "Courier progress"
        );
    }
    owner.advance_order(&mut order).await?;

    tracing::info!(
        %order_id,
        order_status = %order.status,
        delivery_status = %delivery.status,
        picked_up_at = ?delivery.picked_up_at,
        delivered_at = ?delivery.delivered_at,
        "Order complete"
    );
    tracing::info!(stats = ?courier.stats().await?, "Courier stats");

    owner_session.logout();
    courier_session.logout();

    // === 5. Metrics snapshot ===
    tracing::info!("Metrics:\n{}", metrics.render()?);

    Ok(())
}

fn profile(id: i64, first_name: &str, role: Role) -> UserProfile {
    UserProfile {
        user_id: UserId(id),
        email: format!("{}@example.com", first_name.to_lowercase()),
        first_name: first_name.to_string(),
        last_name: String::new(),
        role,
    }
}
