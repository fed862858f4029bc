//! Core configuration.
//!
//! Values come from environment variables with defaults for anything unset.
//! A variable that is set but unusable is reported with a warning and falls
//! back to its default; the other variables still apply.
//!
//! The flat delivery fee is not configurable; it lives in
//! [`crate::domain::shared::FLAT_DELIVERY_FEE`].

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::RetryConfig;

/// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,food_order_core=debug";

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Runtime settings for checkout.
#[derive(Clone, Debug, PartialEq)]
pub struct CoreConfig {
    /// Backoff applied to transient payment failures at checkout
    pub payment_retry: RetryConfig,
    /// Cancel the freshly created order when no payment for it completed
    pub compensate_failed_payments: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            payment_retry: RetryConfig::default(),
            compensate_failed_payments: true,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FOOD_ORDER_PAYMENT_MAX_ATTEMPTS` (default: 3, at least 1)
    /// - `FOOD_ORDER_PAYMENT_INITIAL_DELAY_MS` (default: 200)
    /// - `FOOD_ORDER_COMPENSATE_FAILED_PAYMENTS` (default: true)
    ///
    /// Log filtering is read by the binary from `RUST_LOG`, see
    /// [`DEFAULT_LOG_FILTER`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_attempts = setting(
            &lookup,
            "FOOD_ORDER_PAYMENT_MAX_ATTEMPTS",
            defaults.payment_retry.max_attempts,
            |value| match parse::<u32>("FOOD_ORDER_PAYMENT_MAX_ATTEMPTS", value)? {
                0 => Err(ConfigError::InvalidValue {
                    key: "FOOD_ORDER_PAYMENT_MAX_ATTEMPTS".to_string(),
                    message: "must be at least 1".to_string(),
                }),
                attempts => Ok(attempts),
            },
        );

        let initial_delay_ms = setting(
            &lookup,
            "FOOD_ORDER_PAYMENT_INITIAL_DELAY_MS",
            defaults.payment_retry.initial_delay.as_millis() as u64,
            |value| parse("FOOD_ORDER_PAYMENT_INITIAL_DELAY_MS", value),
        );

        let compensate_failed_payments = setting(
            &lookup,
            "FOOD_ORDER_COMPENSATE_FAILED_PAYMENTS",
            defaults.compensate_failed_payments,
            |value| parse("FOOD_ORDER_COMPENSATE_FAILED_PAYMENTS", value),
        );

        Self {
            payment_retry: RetryConfig {
                max_attempts,
                initial_delay: Duration::from_millis(initial_delay_ms),
                ..defaults.payment_retry
            },
            compensate_failed_payments,
        }
    }
}

/// Value of `key`, or `default` when unset or invalid
fn setting<T, F, P>(lookup: &F, key: &str, default: T, validate: P) -> T
where
    T: std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
    P: FnOnce(&str) -> Result<T, ConfigError>,
{
    let Some(value) = lookup(key) else {
        return default;
    };

    match validate(value.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(key, value = %value, error = %e, default = ?default, "Ignoring invalid setting");
            default
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
