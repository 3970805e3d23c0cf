//! Repository contracts consumed by the service layer.
//!
//! Method names are distinct across traits so a single backend type can
//! implement them all and callers never need disambiguation.

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId, ProductId, SellerId};
use domain::{Customer, Order, OrderItem, Product, Seller};

use crate::Result;

/// Lookup and persistence for customers.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Finds a customer by id; soft-deleted rows are treated as absent.
    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Inserts the customer when it has no id, updates it otherwise.
    /// The assigned id is stamped back into the entity and returned.
    async fn save_customer(&self, customer: &mut Customer) -> Result<CustomerId>;
}

/// Lookup and persistence for sellers.
#[async_trait]
pub trait SellerStore: Send + Sync {
    /// Finds a seller by id; soft-deleted rows are treated as absent.
    async fn find_seller(&self, id: SellerId) -> Result<Option<Seller>>;

    /// Inserts the seller when it has no id, updates it otherwise.
    async fn save_seller(&self, seller: &mut Seller) -> Result<SellerId>;
}

/// Lookup and persistence for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Finds a product by id; soft-deleted rows are treated as absent.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Finds all products among `ids`, in id order.
    ///
    /// Returns only the rows that exist; the caller detects missing ids
    /// by set difference.
    async fn find_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Finds non-deleted products whose name or description contains
    /// `term` (case-insensitive).
    async fn search_products(&self, term: &str) -> Result<Vec<Product>>;

    /// Inserts the product when it has no id, updates it otherwise.
    async fn save_product(&self, product: &mut Product) -> Result<ProductId>;

    /// Sets the product's deletion timestamp. Products are never
    /// physically removed.
    async fn soft_remove_product(&self, id: ProductId) -> Result<()>;
}

/// Persistence for the order aggregate.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order, its items, and the per-item inventory
    /// decrements as one transaction.
    ///
    /// Each decrement is conditional on enough stock remaining; when one
    /// fails the whole transaction is rolled back with
    /// [`StoreError::StockConflict`](crate::StoreError::StockConflict).
    /// Assigned ids are stamped back into the aggregate.
    async fn create_order(&self, order: &mut Order) -> Result<OrderId>;

    /// Finds an order by id with its items and their products eagerly
    /// attached. Soft-deleted orders are treated as absent; rows joined
    /// from inside the aggregate are returned even if soft-deleted, so
    /// an order stays renderable after its product is retired.
    async fn find_order_with_items(&self, id: OrderId) -> Result<Option<Order>>;

    /// Finds all non-deleted orders of a customer, oldest first, with
    /// the same eager-loading contract as [`find_order_with_items`].
    ///
    /// [`find_order_with_items`]: OrderStore::find_order_with_items
    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;
}

/// Lookup and persistence for individual order lines.
#[async_trait]
pub trait OrderItemStore: Send + Sync {
    /// Finds an order item by id with its product eagerly attached;
    /// soft-deleted rows are treated as absent.
    async fn find_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>>;

    /// Persists the item's current status.
    async fn save_order_item(&self, item: &OrderItem) -> Result<()>;
}

/// The full persistence contract, for services that need all of it.
pub trait Store:
    CustomerStore + SellerStore + ProductStore + OrderStore + OrderItemStore
{
}

impl<T: CustomerStore + SellerStore + ProductStore + OrderStore + OrderItemStore> Store for T {}
