//! PostgreSQL-backed store implementation.

use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderItemId, ProductId, SellerId};
use domain::{Customer, Money, Order, OrderItem, OrderItemStatus, Product, Seller};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{CustomerStore, OrderItemStore, OrderStore, ProductStore, SellerStore},
};

const PRODUCT_COLUMNS: &str =
    "id, seller_id, name, description, price, quantity, image, created_at, updated_at, deleted_at";

const ORDER_ITEM_WITH_PRODUCT: &str = r#"
    SELECT oi.id, oi.order_id, oi.count, oi.status,
           oi.created_at, oi.updated_at, oi.deleted_at,
           p.id AS p_id, p.seller_id AS p_seller_id, p.name AS p_name,
           p.description AS p_description, p.price AS p_price,
           p.quantity AS p_quantity, p.image AS p_image,
           p.created_at AS p_created_at, p.updated_at AS p_updated_at,
           p.deleted_at AS p_deleted_at
    FROM order_item oi
    JOIN product p ON p.id = oi.product_id
"#;

/// PostgreSQL store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer> {
        Ok(Customer {
            id: Some(CustomerId::new(row.try_get("id")?)),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    fn row_to_seller(row: &PgRow) -> Result<Seller> {
        Ok(Seller {
            id: Some(SellerId::new(row.try_get("id")?)),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Ok(Product {
            id: Some(ProductId::new(row.try_get("id")?)),
            seller_id: SellerId::new(row.try_get("seller_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            image: row.try_get("image")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    /// Builds an order item from a row of [`ORDER_ITEM_WITH_PRODUCT`],
    /// whose product columns carry a `p_` prefix.
    fn row_to_order_item(row: &PgRow) -> Result<OrderItem> {
        let status_text: String = row.try_get("status")?;
        let status = OrderItemStatus::parse(&status_text)
            .ok_or_else(|| StoreError::UnknownStatus(status_text.clone()))?;

        let product = Product {
            id: Some(ProductId::new(row.try_get("p_id")?)),
            seller_id: SellerId::new(row.try_get("p_seller_id")?),
            name: row.try_get("p_name")?,
            description: row.try_get("p_description")?,
            price: Money::from_cents(row.try_get("p_price")?),
            quantity: row.try_get::<i32, _>("p_quantity")? as u32,
            image: row.try_get("p_image")?,
            created_at: row.try_get("p_created_at")?,
            updated_at: row.try_get("p_updated_at")?,
            deleted_at: row.try_get("p_deleted_at")?,
        };

        Ok(OrderItem {
            id: Some(OrderItemId::new(row.try_get("id")?)),
            order_id: Some(OrderId::new(row.try_get("order_id")?)),
            product,
            count: row.try_get::<i32, _>("count")? as u32,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    async fn load_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let sql = format!(
            "{ORDER_ITEM_WITH_PRODUCT} WHERE oi.order_id = $1 AND oi.deleted_at IS NULL ORDER BY oi.id"
        );
        let rows = sqlx::query(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_order_item).collect()
    }

    async fn assemble_order(&self, row: &PgRow) -> Result<Order> {
        let order_id: i64 = row.try_get("id")?;
        let customer_id: i64 = row.try_get("customer_id")?;

        // The customer join is part of the aggregate and intentionally
        // skips the soft-delete filter.
        let customer_row = sqlx::query(
            "SELECT id, name, address, created_at, updated_at, deleted_at FROM customer WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::Integrity(format!(
                "order {order_id} references missing customer {customer_id}"
            ))
        })?;

        Ok(Order {
            id: Some(OrderId::new(order_id)),
            customer: Self::row_to_customer(&customer_row)?,
            items: self.load_items(order_id).await?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, name, address, created_at, updated_at, deleted_at
             FROM customer WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn save_customer(&self, customer: &mut Customer) -> Result<CustomerId> {
        match customer.id {
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE customer SET name = $2, address = $3, updated_at = now() WHERE id = $1",
                )
                .bind(id.as_i64())
                .bind(&customer.name)
                .bind(&customer.address)
                .execute(&self.pool)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(StoreError::Integrity(format!(
                        "customer {id} does not exist"
                    )));
                }
                Ok(id)
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO customer (name, address, created_at, updated_at)
                     VALUES ($1, $2, $3, $4) RETURNING id",
                )
                .bind(&customer.name)
                .bind(&customer.address)
                .bind(customer.created_at)
                .bind(customer.updated_at)
                .fetch_one(&self.pool)
                .await?;

                customer.id = Some(CustomerId::new(id));
                Ok(CustomerId::new(id))
            }
        }
    }
}

#[async_trait]
impl SellerStore for PostgresStore {
    async fn find_seller(&self, id: SellerId) -> Result<Option<Seller>> {
        let row = sqlx::query(
            "SELECT id, name, address, created_at, updated_at, deleted_at
             FROM seller WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_seller).transpose()
    }

    async fn save_seller(&self, seller: &mut Seller) -> Result<SellerId> {
        match seller.id {
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE seller SET name = $2, address = $3, updated_at = now() WHERE id = $1",
                )
                .bind(id.as_i64())
                .bind(&seller.name)
                .bind(&seller.address)
                .execute(&self.pool)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(StoreError::Integrity(format!("seller {id} does not exist")));
                }
                Ok(id)
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO seller (name, address, created_at, updated_at)
                     VALUES ($1, $2, $3, $4) RETURNING id",
                )
                .bind(&seller.name)
                .bind(&seller.address)
                .bind(seller.created_at)
                .bind(seller.updated_at)
                .fetch_one(&self.pool)
                .await?;

                seller.id = Some(SellerId::new(id));
                Ok(SellerId::new(id))
            }
        }
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1 AND deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn find_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let raw: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE id = ANY($1) AND deleted_at IS NULL ORDER BY id"
        );
        let rows = sqlx::query(&sql).bind(&raw).fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE deleted_at IS NULL AND (name ILIKE $1 OR description ILIKE $1)
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(format!("%{term}%"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product).collect()
    }

    async fn save_product(&self, product: &mut Product) -> Result<ProductId> {
        match product.id {
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE product
                     SET seller_id = $2, name = $3, description = $4, price = $5,
                         quantity = $6, image = $7, updated_at = now()
                     WHERE id = $1",
                )
                .bind(id.as_i64())
                .bind(product.seller_id.as_i64())
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price.cents())
                .bind(product.quantity as i32)
                .bind(&product.image)
                .execute(&self.pool)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(StoreError::Integrity(format!(
                        "product {id} does not exist"
                    )));
                }
                Ok(id)
            }
            None => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO product
                         (seller_id, name, description, price, quantity, image, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
                )
                .bind(product.seller_id.as_i64())
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price.cents())
                .bind(product.quantity as i32)
                .bind(&product.image)
                .bind(product.created_at)
                .bind(product.updated_at)
                .fetch_one(&self.pool)
                .await?;

                product.id = Some(ProductId::new(id));
                Ok(ProductId::new(id))
            }
        }
    }

    async fn soft_remove_product(&self, id: ProductId) -> Result<()> {
        sqlx::query(
            "UPDATE product SET deleted_at = now(), updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create_order(&self, order: &mut Order) -> Result<OrderId> {
        let customer_id = order
            .customer
            .id
            .ok_or(StoreError::Unsaved { entity: "customer" })?;

        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_id, created_at, updated_at)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(customer_id.as_i64())
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for item in &mut order.items {
            let product_id = item
                .product
                .id
                .ok_or(StoreError::Unsaved { entity: "product" })?;

            // Conditional decrement: zero rows affected means another
            // order took the remaining stock first. Dropping the
            // transaction rolls back everything inserted so far.
            let decremented = sqlx::query(
                "UPDATE product
                 SET quantity = quantity - $2, updated_at = now()
                 WHERE id = $1 AND deleted_at IS NULL AND quantity >= $2",
            )
            .bind(product_id.as_i64())
            .bind(item.count as i32)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                return Err(StoreError::StockConflict { product_id });
            }

            let item_id: i64 = sqlx::query_scalar(
                "INSERT INTO order_item (order_id, product_id, count, status, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(order_id)
            .bind(product_id.as_i64())
            .bind(item.count as i32)
            .bind(item.status.as_str())
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(&mut *tx)
            .await?;

            item.id = Some(OrderItemId::new(item_id));
            item.order_id = Some(OrderId::new(order_id));
        }

        tx.commit().await?;

        order.id = Some(OrderId::new(order_id));
        tracing::debug!(order_id, items = order.items.len(), "order persisted");
        Ok(OrderId::new(order_id))
    }

    async fn find_order_with_items(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, customer_id, created_at, updated_at, deleted_at
             FROM orders WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble_order(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, customer_id, created_at, updated_at, deleted_at
             FROM orders WHERE customer_id = $1 AND deleted_at IS NULL ORDER BY id",
        )
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.assemble_order(row).await?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderItemStore for PostgresStore {
    async fn find_order_item(&self, id: OrderItemId) -> Result<Option<OrderItem>> {
        let sql = format!("{ORDER_ITEM_WITH_PRODUCT} WHERE oi.id = $1 AND oi.deleted_at IS NULL");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_order_item).transpose()
    }

    async fn save_order_item(&self, item: &OrderItem) -> Result<()> {
        let id = item.id.ok_or(StoreError::Unsaved {
            entity: "order item",
        })?;

        let updated = sqlx::query(
            "UPDATE order_item SET status = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_i64())
        .bind(item.status.as_str())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::Integrity(format!(
                "order item {id} does not exist"
            )));
        }
        Ok(())
    }
}
