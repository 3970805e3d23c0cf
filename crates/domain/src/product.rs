//! Product entity and its inventory guard.

use chrono::{DateTime, Utc};
use common::{ProductId, SellerId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// A product listed by a seller, owning the available stock count.
///
/// Products are never hard-deleted; retiring one sets `deleted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Storage-assigned id; `None` until first persisted.
    pub id: Option<ProductId>,
    pub seller_id: SellerId,
    pub name: String,
    pub description: String,
    /// Price per unit in minor currency units.
    pub price: Money,
    /// Units currently in stock. Never goes below zero through any
    /// entity method; the storage layer re-guards the decrement.
    pub quantity: u32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates a new, unpersisted product.
    ///
    /// Fails with [`DomainError::InvalidQuantity`] when the initial
    /// quantity is zero: a listing must start with stock to sell.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        quantity: u32,
        seller_id: SellerId,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            seller_id,
            name: name.into(),
            description: description.into(),
            price,
            quantity,
            image: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Returns true if `count` units can be ordered.
    ///
    /// The check is strictly greater-than, matching the stock policy of
    /// keeping at least one unit behind after a sale: an order equal to
    /// the full remaining quantity is rejected.
    pub fn is_orderable(&self, count: u32) -> bool {
        self.quantity > count
    }

    /// Subtracts `count` from the stock.
    ///
    /// Fails with [`DomainError::InsufficientStock`] if the result would
    /// go below zero; the quantity is left unchanged in that case. The
    /// caller is responsible for persisting the mutation.
    pub fn decrement(&mut self, count: u32) -> Result<(), DomainError> {
        match self.quantity.checked_sub(count) {
            Some(remaining) => {
                self.quantity = remaining;
                Ok(())
            }
            None => Err(DomainError::InsufficientStock {
                available: self.quantity,
                requested: count,
            }),
        }
    }

    /// Applies a field-wise patch; `None` fields are left untouched.
    pub fn apply_update(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        price: Option<Money>,
        image: Option<String>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(image) = image {
            self.image = Some(image);
        }
    }

    /// Returns true if the product has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
