//! Customer entity.

use chrono::{DateTime, Utc};
use common::CustomerId;
use serde::{Deserialize, Serialize};

/// A customer able to place orders.
///
/// Account management (sign-up, authentication) lives outside this crate;
/// the order flow only needs the customer row it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Storage-assigned id; `None` until first persisted.
    pub id: Option<CustomerId>,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Creates a new, unpersisted customer.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            address: address.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true if the customer has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
