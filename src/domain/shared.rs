use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Shared Value Objects - identifiers and money used by every aggregate
// ============================================================================

/// Monetary amount in the vendor's currency (rand in the live product).
pub type Money = Decimal;

/// Flat delivery fee added to every cart and order total (R25.00).
pub const FLAT_DELIVERY_FEE: Money = Decimal::from_parts(2500, 0, 0, false, 2);

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Menu item key; one cart line per menu item
    MenuItemId
);
numeric_id!(
    /// Restaurant/merchant identifier
    VendorId
);
numeric_id!(CustomerId);
numeric_id!(OrderId);
numeric_id!(DeliveryId);
numeric_id!(
    /// Identifier of the courier (driver) fulfilling a delivery
    CourierId
);
numeric_id!(UserId);
numeric_id!(PaymentId);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_flat_delivery_fee_is_twenty_five() {
        assert_eq!(FLAT_DELIVERY_FEE, Decimal::from_str("25.00").unwrap());
        assert_eq!(FLAT_DELIVERY_FEE.to_string(), "25.00");
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&VendorId(5)).unwrap();
        assert_eq!(json, "5");

        let id: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(id, OrderId(42));
        assert_eq!(id.to_string(), "42");
    }
}
