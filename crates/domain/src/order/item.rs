//! Order line: a product snapshot, a count, and a lifecycle.

use chrono::{DateTime, Utc};
use common::{OrderId, OrderItemId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;
use crate::product::Product;

use super::status::OrderItemStatus;

/// A single line of an order.
///
/// Binds one product to a requested count and tracks the line's status.
/// Membership in an order is fixed once the order is created; only the
/// status changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Storage-assigned id; `None` until the order is persisted.
    pub id: Option<OrderItemId>,
    /// Back-reference to the owning order, stamped at persist/load time
    /// (ids are storage-assigned, so it cannot exist earlier).
    pub order_id: Option<OrderId>,
    pub product: Product,
    pub count: u32,
    pub status: OrderItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl OrderItem {
    /// Builds an order line for `count` units of `product`.
    ///
    /// Fails with [`DomainError::InvalidQuantity`] when `count` is zero
    /// and with [`DomainError::InsufficientStock`] when the product
    /// cannot cover the count. The product is not decremented here;
    /// that happens through [`OrderItem::apply_to_inventory`].
    pub fn of(product: Product, count: u32) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidQuantity { quantity: count });
        }

        if !product.is_orderable(count) {
            return Err(DomainError::InsufficientStock {
                available: product.quantity,
                requested: count,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            order_id: None,
            product,
            count,
            status: OrderItemStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Decrements the bound product's stock by this line's count.
    ///
    /// Call exactly once per line, at order-creation time. Status
    /// transitions never touch inventory.
    pub fn apply_to_inventory(&mut self) -> Result<(), DomainError> {
        self.product.decrement(self.count)
    }

    /// Confirms a pending line.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        if !self.status.can_confirm() {
            return Err(DomainError::InvalidTransition {
                current: self.status,
                action: "confirm",
            });
        }
        self.status = OrderItemStatus::Confirmed;
        Ok(())
    }

    /// Ships a confirmed line.
    pub fn ship(&mut self) -> Result<(), DomainError> {
        if !self.status.can_ship() {
            return Err(DomainError::InvalidTransition {
                current: self.status,
                action: "ship",
            });
        }
        self.status = OrderItemStatus::Shipped;
        Ok(())
    }

    /// Marks a shipped line as delivered.
    pub fn deliver(&mut self) -> Result<(), DomainError> {
        if !self.status.can_deliver() {
            return Err(DomainError::InvalidTransition {
                current: self.status,
                action: "deliver",
            });
        }
        self.status = OrderItemStatus::Delivered;
        Ok(())
    }

    /// Cancels a line that has not shipped yet.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if !self.status.can_cancel() {
            return Err(DomainError::InvalidTransition {
                current: self.status,
                action: "cancel",
            });
        }
        self.status = OrderItemStatus::Cancelled;
        Ok(())
    }

    /// Returns the line total (unit price times count).
    pub fn total_price(&self) -> Money {
        self.product.price.multiply(self.count)
    }
}
