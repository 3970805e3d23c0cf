//! Order aggregate: a customer and the lines they ordered.

pub mod item;
pub mod status;

pub use item::OrderItem;
pub use status::OrderItemStatus;

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::money::Money;

/// An order placed by a customer.
///
/// The item list is fixed at creation; only each line's status changes
/// afterwards. Items keep their creation order for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Storage-assigned id; `None` until persisted.
    pub id: Option<OrderId>,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds an order from a customer and pre-built lines.
    pub fn of(customer: Customer, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            customer,
            items,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the order total across all lines.
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(OrderItem::total_price).sum()
    }

    /// Returns true if the order has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use common::SellerId;

    fn line(price_cents: i64, quantity: u32, count: u32) -> OrderItem {
        let product = Product::new(
            "Widget",
            "A widget",
            Money::from_cents(price_cents),
            quantity,
            SellerId::new(1),
        )
        .unwrap();
        OrderItem::of(product, count).unwrap()
    }

    #[test]
    fn of_keeps_items_in_creation_order() {
        let items = vec![line(1000, 5, 1), line(500, 5, 2), line(250, 5, 3)];
        let order = Order::of(Customer::new("Jane Doe", "1 Main St"), items);

        assert_eq!(order.item_count(), 3);
        assert_eq!(order.items[0].product.price.cents(), 1000);
        assert_eq!(order.items[1].product.price.cents(), 500);
        assert_eq!(order.items[2].product.price.cents(), 250);
    }

    #[test]
    fn total_amount_sums_line_totals() {
        let items = vec![line(1000, 5, 2), line(500, 5, 1)];
        let order = Order::of(Customer::new("Jane Doe", "1 Main St"), items);
        assert_eq!(order.total_amount().cents(), 2500);
    }

    #[test]
    fn empty_order_totals_zero() {
        let order = Order::of(Customer::new("Jane Doe", "1 Main St"), vec![]);
        assert_eq!(order.item_count(), 0);
        assert!(order.total_amount().is_zero());
    }
}
