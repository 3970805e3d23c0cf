//! Seller entity.

use chrono::{DateTime, Utc};
use common::SellerId;
use serde::{Deserialize, Serialize};

/// A seller offering products for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Storage-assigned id; `None` until first persisted.
    pub id: Option<SellerId>,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Seller {
    /// Creates a new, unpersisted seller.
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

    /// Returns true if the seller has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
