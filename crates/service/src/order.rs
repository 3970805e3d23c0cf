//! Order placement and order-line lifecycle orchestration.

use std::collections::HashMap;

use common::{CustomerId, OrderId, OrderItemId, ProductId};
use domain::{Order, OrderItem, OrderItemStatus, Product};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ServiceError;

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub count: u32,
}

/// Service for placing orders and driving order-line statuses.
pub struct OrderService<S> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order for a customer.
    ///
    /// Validates the customer and every referenced product, builds the
    /// order lines (which re-validate stock), applies the inventory
    /// decrements, and persists the whole aggregate in one transaction.
    /// Any failure after the product lookup leaves nothing persisted.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        lines: &[OrderLine],
    ) -> Result<OrderId, ServiceError> {
        let customer = self
            .store
            .find_customer(customer_id)
            .await?
            .ok_or(ServiceError::CustomerNotFound(customer_id))?;

        if lines.is_empty() {
            return Err(ServiceError::EmptyOrder);
        }

        // Collapse duplicate product ids: the first occurrence keeps its
        // position, the last count wins.
        let mut ordered: Vec<(ProductId, u32)> = Vec::with_capacity(lines.len());
        let mut positions: HashMap<ProductId, usize> = HashMap::with_capacity(lines.len());
        for line in lines {
            match positions.get(&line.product_id) {
                Some(&idx) => ordered[idx].1 = line.count,
                None => {
                    positions.insert(line.product_id, ordered.len());
                    ordered.push((line.product_id, line.count));
                }
            }
        }

        let ids: Vec<ProductId> = ordered.iter().map(|(id, _)| *id).collect();
        let products = self.store.find_products_by_ids(&ids).await?;
        let mut by_id: HashMap<ProductId, Product> = products
            .into_iter()
            .filter_map(|product| product.id.map(|id| (id, product)))
            .collect();

        let missing: Vec<ProductId> = ids
            .iter()
            .filter(|id| !by_id.contains_key(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::UnknownProducts {
                product_ids: missing,
            });
        }

        let mut items = Vec::with_capacity(ordered.len());
        for (product_id, count) in ordered {
            let product = by_id
                .remove(&product_id)
                .ok_or(ServiceError::UnknownProducts {
                    product_ids: vec![product_id],
                })?;
            let mut item = OrderItem::of(product, count)?;
            item.apply_to_inventory()?;
            items.push(item);
        }

        let mut order = Order::of(customer, items);
        let order_id = self.store.create_order(&mut order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, %customer_id, items = order.items.len(), "order created");
        Ok(order_id)
    }

    /// Fetches an order with its items and their products.
    #[tracing::instrument(skip(self))]
    pub async fn find_order(&self, id: OrderId) -> Result<Order, ServiceError> {
        self.store
            .find_order_with_items(id)
            .await?
            .ok_or(ServiceError::OrderNotFound(id))
    }

    /// Fetches all non-deleted orders of a customer, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn find_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self.store.find_orders_by_customer(customer_id).await?)
    }

    /// Moves an order line to `target` via the matching transition.
    ///
    /// `Pending` has no transition leading back to it, so requesting it
    /// is rejected outright rather than silently ignored.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_item_status(
        &self,
        id: OrderItemId,
        target: OrderItemStatus,
    ) -> Result<(), ServiceError> {
        let mut item = self
            .store
            .find_order_item(id)
            .await?
            .ok_or(ServiceError::OrderItemNotFound(id))?;

        match target {
            OrderItemStatus::Confirmed => item.confirm()?,
            OrderItemStatus::Shipped => item.ship()?,
            OrderItemStatus::Delivered => item.deliver()?,
            OrderItemStatus::Cancelled => item.cancel()?,
            OrderItemStatus::Pending => {
                return Err(ServiceError::InvalidTargetStatus { status: target });
            }
        }

        self.store.save_order_item(&item).await?;
        Ok(())
    }

    /// Cancels an order line.
    ///
    /// Persistence failures propagate; a caller must be able to see a
    /// cancellation that did not stick.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order_item(&self, id: OrderItemId) -> Result<(), ServiceError> {
        let mut item = self
            .store
            .find_order_item(id)
            .await?
            .ok_or(ServiceError::OrderItemNotFound(id))?;

        item.cancel()?;
        self.store.save_order_item(&item).await?;

        metrics::counter!("order_items_cancelled_total").increment(1);
        Ok(())
    }
}
