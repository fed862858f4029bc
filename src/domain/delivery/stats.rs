use serde::Serialize;

use super::value_objects::{Delivery, DeliveryStatus};

/// Courier dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub failed: usize,
    /// Completed share of all deliveries, rounded to a whole percent
    pub success_rate: u32,
}

impl DeliveryStats {
    pub fn from_deliveries(deliveries: &[Delivery]) -> Self {
        let mut stats = DeliveryStats {
            total: deliveries.len(),
            ..Default::default()
        };

        for delivery in deliveries {
            match delivery.status {
                DeliveryStatus::Delivered => stats.completed += 1,
                DeliveryStatus::Failed => stats.failed += 1,
                _ => stats.active += 1,
            }
        }

        if stats.total > 0 {
            stats.success_rate = ((stats.completed as f64 / stats.total as f64) * 100.0).round() as u32;
        }

        stats
    }
}
