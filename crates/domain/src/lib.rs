//! Domain layer for the commerce backend.
//!
//! This crate provides the persisted entities and the invariants they
//! enforce:
//! - `Product` with its inventory guard
//! - `Order` and `OrderItem` with the order-line status state machine
//! - `Customer` and `Seller` as referenced parties
//!
//! Everything here is synchronous and storage-agnostic; persistence goes
//! through the repository contracts in the `store` crate.

pub mod customer;
pub mod error;
pub mod money;
pub mod order;
pub mod product;
pub mod seller;

pub use customer::Customer;
pub use error::DomainError;
pub use money::Money;
pub use order::{Order, OrderItem, OrderItemStatus};
pub use product::Product;
pub use seller::Seller;
