//! In-memory store implementation for tests.
//!
//! Keeps normalized rows behind a single `RwLock` and mirrors the
//! observable behaviour of the PostgreSQL implementation, including
//! soft-delete filtering and the all-or-nothing order transaction: the
//! write lock is held across the whole `create_order` mutation, so
//! concurrent orders see exactly-one-winner semantics on scarce stock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, OrderItemId, ProductId, SellerId};
use domain::{Customer, Order, OrderItem, OrderItemStatus, Product, Seller};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{CustomerStore, OrderItemStore, OrderStore, ProductStore, SellerStore},
};

#[derive(Debug, Clone)]
struct OrderRow {
    id: i64,
    customer_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    count: u32,
    status: OrderItemStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    customers: HashMap<i64, Customer>,
    sellers: HashMap<i64, Seller>,
    products: HashMap<i64, Product>,
    orders: HashMap<i64, OrderRow>,
    order_items: HashMap<i64, OrderItemRow>,
    next_id: i64,
}

impl State {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn assemble_item(&self, row: &OrderItemRow) -> Result<OrderItem> {
        // Joins inside the aggregate do not filter soft-deleted rows.
        let product = self.products.get(&row.product_id).cloned().ok_or_else(|| {
            StoreError::Integrity(format!(
                "order item {} references missing product {}",
                row.id, row.product_id
            ))
        })?;

        Ok(OrderItem {
            id: Some(OrderItemId::new(row.id)),
            order_id: Some(OrderId::new(row.order_id)),
            product,
            count: row.count,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }

    fn assemble_order(&self, row: &OrderRow) -> Result<Order> {
        let customer = self.customers.get(&row.customer_id).cloned().ok_or_else(|| {
            StoreError::Integrity(format!(
                "order {} references missing customer {}",
                row.id, row.customer_id
            ))
        })?;

        let mut item_rows: Vec<&OrderItemRow> = self
            .order_items
            .values()
            .filter(|item| item.order_id == row.id && item.deleted_at.is_none())
            .collect();
        item_rows.sort_by_key(|item| item.id);

        let items = item_rows
            .into_iter()
            .map(|item| self.assemble_item(item))
            .collect::<Result<Vec<_>>>()?;

        Ok(Order {
            id: Some(OrderId::new(row.id)),
            customer,
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// In-memory store implementation for testing.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of persisted orders, deleted included.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Clears all rows.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = State::default();
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let state = self.state.read().await;
        Ok(state
            .customers
            .get(&id.as_i64())
            .filter(|customer| customer.deleted_at.is_none())
            .cloned())
    }

    async fn save_customer(&self, customer: &mut Customer) -> Result<CustomerId> {
        let mut state = self.state.write().await;
        match customer.id {
            Some(id) => {
                customer.updated_at = Utc::now();
                let row = state
                    .customers
                    .get_mut(&id.as_i64())
                    .ok_or_else(|| StoreError::Integrity(format!("customer {id} does not exist")))?;
                *row = customer.clone();
                Ok(id)
            }
            None => {
                let id = state.alloc_id();
                customer.id = Some(CustomerId::new(id));
                state.customers.insert(id, customer.clone());
                Ok(CustomerId::new(id))
            }
        }
    }
}

#[async_trait]
impl SellerStore for InMemoryStore {
    async fn find_seller(&self, id: SellerId) -> Result<Option<Seller>> {
        let state = self.state.read().await;
        Ok(state
            .sellers
            .get(&id.as_i64())
            .filter(|seller| seller.deleted_at.is_none())
            .cloned())
    }

    async fn save_seller(&self, seller: &mut Seller) -> Result<SellerId> {
        let mut state = self.state.write().await;
        match seller.id {
            Some(id) => {
                seller.updated_at = Utc::now();
                let row = state
                    .sellers
                    .get_mut(&id.as_i64())
                    .ok_or_else(|| StoreError::Integrity(format!("seller {id} does not exist")))?;
                *row = seller.clone();
                Ok(id)
            }
            None => {
                let id = state.alloc_id();
                seller.id = Some(SellerId::new(id));
                state.sellers.insert(id, seller.clone());
                Ok(SellerId::new(id))
            }
        }
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .get(&id.as_i64())
            .filter(|product| product.deleted_at.is_none())
            .cloned())
    }

    async fn find_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let wanted: HashSet<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| {
                product.deleted_at.is_none()
                    && product
                        .id
                        .is_some_and(|id| wanted.contains(&id.as_i64()))
            })
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id.map(|id| id.as_i64()));
        Ok(products)
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let needle = term.to_lowercase();
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| {
                product.deleted_at.is_none()
                    && (product.name.to_lowercase().contains(&needle)
                        || product.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        products.sort_by_key(|product| product.id.map(|id| id.as_i64()));
        Ok(products)
    }

    async fn save_product(&self, product: &mut Product) -> Result<ProductId> {
        let mut state = self.state.write().await;
        match product.id {
            Some(id) => {
                product.updated_at = Utc::now();
                let row = state
                    .products
                    .get_mut(&id.as_i64())
                    .ok_or_else(|| StoreError::Integrity(format!("product {id} does not exist")))?;
                *row = product.clone();
                Ok(id)
            }
            None => {
                let id = state.alloc_id();
                product.id = Some(ProductId::new(id));
                state.products.insert(id, product.clone());
                Ok(ProductId::new(id))
            }
        }
    }

    async fn soft_remove_product(&self, id: ProductId) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(product) = state.products.get_mut(&id.as_i64())
            && product.deleted_at.is_none()
        {
            product.deleted_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_order(&self, order: &mut Order) -> Result<OrderId> {
        // One write guard across validation and mutation: concurrent
        // orders serialize here the way the SQL transaction does.
        let mut state = self.state.write().await;

        let customer_id = order
            .customer
            .id
            .ok_or(StoreError::Unsaved { entity: "customer" })?;
        if !state.customers.contains_key(&customer_id.as_i64()) {
            return Err(StoreError::Integrity(format!(
                "order references missing customer {customer_id}"
            )));
        }

        // Validate every decrement before touching anything.
        for item in &order.items {
            let product_id = item
                .product
                .id
                .ok_or(StoreError::Unsaved { entity: "product" })?;
            let product = state
                .products
                .get(&product_id.as_i64())
                .filter(|product| product.deleted_at.is_none())
                .ok_or(StoreError::StockConflict { product_id })?;
            if product.quantity < item.count {
                return Err(StoreError::StockConflict { product_id });
            }
        }

        let order_id = state.alloc_id();
        state.orders.insert(
            order_id,
            OrderRow {
                id: order_id,
                customer_id: customer_id.as_i64(),
                created_at: order.created_at,
                updated_at: order.updated_at,
                deleted_at: None,
            },
        );

        for item in &mut order.items {
            let product_id = item
                .product
                .id
                .ok_or(StoreError::Unsaved { entity: "product" })?;
            let product = state
                .products
                .get_mut(&product_id.as_i64())
                .ok_or(StoreError::StockConflict { product_id })?;
            product.quantity -= item.count;
            product.updated_at = Utc::now();

            let item_id = state.alloc_id();
            state.order_items.insert(
                item_id,
                OrderItemRow {
                    id: item_id,
                    order_id,
                    product_id: product_id.as_i64(),
                    count: item.count,
                    status: item.status,
                    created_at: item.created_at,
                    updated_at: item.updated_at,
                    deleted_at: None,
                },
            );
            item.id = Some(OrderItemId::new(item_id));
            item.order_id = Some(OrderId::new(order_id));
        }

        order.id = Some(OrderId::new(order_id));
        Ok(OrderId::new(order_id))
    }

    async fn find_order_with_items(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        match state
            .orders
            .get(&id.as_i64())
            .filter(|order| order.deleted_at.is_none())
        {
            Some(row) => Ok(Some(state.assemble_order(row)?)),
            None => Ok(None),
        }
    }

    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut rows: Vec<&OrderRow> = state
            .orders
            .values()
            .filter(|order| {
                order.customer_id == customer_id.as_i64() && order.deleted_at.is_none()
            })
            .collect();
        rows.sort_by_key(|order| order.id);

        rows.into_iter()
            .map(|row| state.assemble_order(row))
            .collect()
    }
}

#[async_trait]
impl OrderItemStore for InMemoryStore {
    async fn find_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        let state = self.state.read().await;
        match state
            .order_items
            .get(&id.as_i64())
            .filter(|item| item.deleted_at.is_none())
        {
            Some(row) => Ok(Some(state.assemble_item(row)?)),
            None => Ok(None),
        }
    }

    async fn save_order_item(&self, item: &OrderItem) -> Result<()> {
        let id = item.id.ok_or(StoreError::Unsaved {
            entity: "order item",
        })?;
        let mut state = self.state.write().await;
        let row = state
            .order_items
            .get_mut(&id.as_i64())
            .filter(|row| row.deleted_at.is_none())
            .ok_or_else(|| StoreError::Integrity(format!("order item {id} does not exist")))?;
        row.status = item.status;
        row.updated_at = Utc::now();
        Ok(())
    }
}
