use common::ProductId;
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The conditional inventory decrement found too little stock left.
    /// The whole order transaction is rolled back when this is raised.
    #[error("stock conflict for product {product_id}: not enough quantity remaining")]
    StockConflict { product_id: ProductId },

    /// A status column held text that is not a known order-item status.
    #[error("unknown order item status in storage: {0:?}")]
    UnknownStatus(String),

    /// An entity was used before it was ever persisted (it has no id).
    #[error("{entity} has not been persisted yet")]
    Unsaved { entity: &'static str },

    /// A stored row references another row that does not exist.
    #[error("referential integrity violation: {0}")]
    Integrity(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
