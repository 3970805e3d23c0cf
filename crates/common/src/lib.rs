//! Shared types for the commerce backend.

pub mod ids;

pub use ids::{CustomerId, OrderId, OrderItemId, ProductId, SellerId};
