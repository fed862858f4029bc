use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::LifecycleStatus;
use crate::domain::shared::{CourierId, DeliveryId, OrderId};

// ============================================================================
// Delivery Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Assigned,
    HeadingToRestaurant,
    PickedUp,
    HeadingToCustomer,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 6] = [
        DeliveryStatus::Assigned,
        DeliveryStatus::HeadingToRestaurant,
        DeliveryStatus::PickedUp,
        DeliveryStatus::HeadingToCustomer,
        DeliveryStatus::Delivered,
        DeliveryStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "ASSIGNED",
            DeliveryStatus::HeadingToRestaurant => "HEADING_TO_RESTAURANT",
            DeliveryStatus::PickedUp => "PICKED_UP",
            DeliveryStatus::HeadingToCustomer => "HEADING_TO_CUSTOMER",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Failed => "FAILED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "Assigned",
            DeliveryStatus::HeadingToRestaurant => "Heading to Restaurant",
            DeliveryStatus::PickedUp => "Picked Up",
            DeliveryStatus::HeadingToCustomer => "On the Way",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Failed => "Failed",
        }
    }

    /// Courier-facing action that moves out of this status, if any
    pub fn action_label(self) -> Option<&'static str> {
        match self {
            DeliveryStatus::Assigned => Some("Head to Restaurant"),
            DeliveryStatus::HeadingToRestaurant => Some("Mark as Picked Up"),
            DeliveryStatus::PickedUp => Some("Heading to Customer"),
            DeliveryStatus::HeadingToCustomer => Some("Mark as Delivered"),
            DeliveryStatus::Delivered | DeliveryStatus::Failed => None,
        }
    }

    /// Still in the courier's hands
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl LifecycleStatus for DeliveryStatus {
    fn next(self) -> Option<Self> {
        match self {
            DeliveryStatus::Assigned => Some(DeliveryStatus::HeadingToRestaurant),
            DeliveryStatus::HeadingToRestaurant => Some(DeliveryStatus::PickedUp),
            DeliveryStatus::PickedUp => Some(DeliveryStatus::HeadingToCustomer),
            DeliveryStatus::HeadingToCustomer => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered | DeliveryStatus::Failed => None,
        }
    }

    fn absorbing() -> Self {
        DeliveryStatus::Failed
    }

    fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical courier task tied to one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub order_id: OrderId,
    #[serde(alias = "driverId")]
    pub courier_id: CourierId,
    #[serde(default, alias = "driverName")]
    pub courier_name: Option<String>,
    #[serde(default, alias = "driverPhone")]
    pub courier_phone: Option<String>,
    pub delivery_address: String,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub current_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    pub fn next_status(&self) -> Option<DeliveryStatus> {
        self.status.next()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Stamp the milestone timestamp belonging to the current status.
    /// Timestamps are write-once: an existing value is never replaced.
    pub fn stamp_milestone(&mut self, at: DateTime<Utc>) {
        match self.status {
            DeliveryStatus::PickedUp => {
                self.picked_up_at.get_or_insert(at);
            }
            DeliveryStatus::Delivered => {
                self.delivered_at.get_or_insert(at);
            }
            _ => {}
        }
    }

    /// Replace this delivery with the version the dispatch service accepted,
    /// keeping timestamps that were already set locally.
    pub fn adopt(&mut self, accepted: Delivery) {
        let picked_up_at = self.picked_up_at.or(accepted.picked_up_at);
        let delivered_at = self.delivered_at.or(accepted.delivered_at);

        *self = Delivery {
            picked_up_at,
            delivered_at,
            ..accepted
        };
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn delivery(status: DeliveryStatus) -> Delivery {
        Delivery {
            id: DeliveryId(1),
            order_id: OrderId(10),
            courier_id: CourierId(7),
            courier_name: Some("Sipho".to_string()),
            courier_phone: None,
            delivery_address: "1 Main Rd".to_string(),
            status,
            current_location: None,
            notes: None,
            picked_up_at: None,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_forward_chain_is_exact() {
        let mut chain = vec![DeliveryStatus::Assigned];
        while let Some(next) = chain.last().unwrap().next() {
            chain.push(next);
        }

        assert_eq!(
            chain,
            vec![
                DeliveryStatus::Assigned,
                DeliveryStatus::HeadingToRestaurant,
                DeliveryStatus::PickedUp,
                DeliveryStatus::HeadingToCustomer,
                DeliveryStatus::Delivered,
            ]
        );
    }

    #[test]
    fn test_failed_is_absorbing() {
        for status in DeliveryStatus::ALL {
            assert_eq!(
                status.can_transition_to(DeliveryStatus::Failed),
                !status.is_terminal(),
                "{status}"
            );
            assert!(!DeliveryStatus::Failed.can_transition_to(status));
        }
    }

    #[test]
    fn test_action_labels_follow_terminality() {
        for status in DeliveryStatus::ALL {
            assert_eq!(status.action_label().is_some(), status.next().is_some(), "{status}");
        }
    }

    #[test]
    fn test_stamp_milestone_is_write_once() {
        let first = Utc::now() - Duration::minutes(10);
        let mut d = delivery(DeliveryStatus::PickedUp);

        d.stamp_milestone(first);
        d.stamp_milestone(Utc::now());

        assert_eq!(d.picked_up_at, Some(first));
        assert_eq!(d.delivered_at, None);
    }

    #[test]
    fn test_adopt_keeps_existing_timestamps() {
        let original = Utc::now() - Duration::minutes(30);
        let mut local = delivery(DeliveryStatus::PickedUp);
        local.picked_up_at = Some(original);

        let mut accepted = delivery(DeliveryStatus::HeadingToCustomer);
        accepted.picked_up_at = Some(Utc::now());
        accepted.current_location = Some("Long St".to_string());

        local.adopt(accepted);

        assert_eq!(local.status, DeliveryStatus::HeadingToCustomer);
        assert_eq!(local.picked_up_at, Some(original));
        assert_eq!(local.current_location.as_deref(), Some("Long St"));
    }

    #[test]
    fn test_adopt_takes_accepted_status_even_when_not_requested() {
        let mut local = delivery(DeliveryStatus::HeadingToRestaurant);
        let mut accepted = delivery(DeliveryStatus::Failed);
        accepted.notes = Some("Restaurant closed".to_string());

        // PICKED_UP was requested, dispatch recorded FAILED
        local.adopt(accepted.clone());
        local.stamp_milestone(Utc::now());

        assert_eq!(local, accepted);
        assert!(local.picked_up_at.is_none());
        assert!(local.delivered_at.is_none());
    }

    #[test]
    fn test_delivery_accepts_driver_field_names() {
        let json = r#"{
            "id": 4,
            "orderId": 12,
            "driverId": 7,
            "driverName": "Sipho",
            "deliveryAddress": "1 Main Rd",
            "status": "HEADING_TO_RESTAURANT",
            "createdAt": "2026-01-05T12:00:00Z"
        }"#;

        let d: Delivery = serde_json::from_str(json).unwrap();
        assert_eq!(d.courier_id, CourierId(7));
        assert_eq!(d.status, DeliveryStatus::HeadingToRestaurant);
        assert_eq!(d.next_status(), Some(DeliveryStatus::PickedUp));
        assert!(d.picked_up_at.is_none());
    }
}
