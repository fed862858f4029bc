//! Food-ordering core: a single-vendor cart, order and delivery lifecycle
//! state machines, checkout against an external order store and payment
//! gateway, and role-gated sessions for customers, restaurant owners and
//! couriers.

pub mod config;
pub mod event_sourcing;
pub mod domain;
pub mod services;
pub mod checkout;
pub mod session;
pub mod metrics;
pub mod utils;

pub use checkout::{CheckoutError, CheckoutHandler, CheckoutReceipt, CheckoutRequest};
pub use config::{ConfigError, CoreConfig};
pub use domain::lifecycle::{LifecycleStatus, TransitionOutcome};
pub use session::{Actor, Role, Services, Session, SessionError, UserProfile};
