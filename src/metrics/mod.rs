use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for the ordering core
// ============================================================================
//
// Provides counters for:
// - Checkout outcomes (orders placed, failures by stage, compensations)
// - Order and delivery status transitions
// - Rejected transitions by reason
//
// Exposed in Prometheus text format via `Metrics::render`.
// ============================================================================

/// Central metrics registry
pub struct Metrics {
    registry: Registry,

    // Checkout Metrics
    pub orders_placed: IntCounter,
    pub checkout_failures: IntCounterVec,
    pub payments_compensated: IntCounter,

    // Lifecycle Metrics
    pub status_transitions: IntCounterVec,
    pub transitions_rejected: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounter::new(
            "orders_placed_total",
            "Orders created and paid through checkout",
        )?;
        registry.register(Box::new(orders_placed.clone()))?;

        let checkout_failures = IntCounterVec::new(
            Opts::new("checkout_failures_total", "Checkout attempts that did not complete"),
            &["stage"],
        )?;
        registry.register(Box::new(checkout_failures.clone()))?;

        let payments_compensated = IntCounter::new(
            "payments_compensated_total",
            "Orders cancelled because their payment failed",
        )?;
        registry.register(Box::new(payments_compensated.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("status_transitions_total", "Status transitions accepted by the authoritative store"),
            &["entity", "to"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let transitions_rejected = IntCounterVec::new(
            Opts::new("transitions_rejected_total", "Status transitions that were not applied"),
            &["entity", "reason"],
        )?;
        registry.register(Box::new(transitions_rejected.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            checkout_failures,
            payments_compensated,
            status_transitions,
            transitions_rejected,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_transition(&self, entity: &str, to: &str) {
        self.status_transitions.with_label_values(&[entity, to]).inc();
    }

    pub fn record_rejected(&self, entity: &str, reason: &str) {
        self.transitions_rejected.with_label_values(&[entity, reason]).inc();
    }

    pub fn record_checkout_failure(&self, stage: &str) {
        self.checkout_failures.with_label_values(&[stage]).inc();
    }

    /// Encode every registered metric in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_registered_and_rendered() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("order", "CONFIRMED");
        metrics.record_transition("order", "CONFIRMED");
        metrics.record_rejected("delivery", "invalid_transition");
        metrics.record_checkout_failure("payment");

        assert_eq!(
            metrics.status_transitions.with_label_values(&["order", "CONFIRMED"]).get(),
            2
        );

        let text = metrics.render().unwrap();
        assert!(text.contains("status_transitions_total"));
        assert!(text.contains("transitions_rejected_total"));
        assert!(text.contains("checkout_failures_total{stage=\"payment\"} 1"));
    }
}
