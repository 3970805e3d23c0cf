//! Identifier newtypes for every persisted entity.
//!
//! Ids are opaque `i64`s assigned monotonically by storage (`BIGSERIAL`).
//! Each entity gets its own newtype to prevent mixing, say, a product id
//! with an order id in a repository call.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw storage-assigned id.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying integer.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a customer.
    CustomerId
}

entity_id! {
    /// Unique identifier for a seller.
    SellerId
}

entity_id! {
    /// Unique identifier for a product.
    ProductId
}

entity_id! {
    /// Unique identifier for an order.
    OrderId
}

entity_id! {
    /// Unique identifier for a single order line.
    OrderItemId
}
