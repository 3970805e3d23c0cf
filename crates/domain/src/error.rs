//! Domain error types.

use thiserror::Error;

use crate::order::OrderItemStatus;

/// Errors raised by entity-level guards.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A quantity or count of zero was supplied where a positive value is
    /// required.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The product does not have enough stock for the requested count.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    /// An order-item status transition was attempted from a status that
    /// does not permit it. The item is left unchanged.
    #[error("invalid status transition: cannot {action} from {current} status")]
    InvalidTransition {
        current: OrderItemStatus,
        action: &'static str,
    },
}
