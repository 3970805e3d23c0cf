//! Service error types and their stable kinds.

use common::{CustomerId, OrderId, OrderItemId, ProductId, SellerId};
use domain::{DomainError, OrderItemStatus};
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced customer does not exist (or is soft-deleted).
    #[error("customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// The referenced seller does not exist (or is soft-deleted).
    #[error("seller not found: {0}")]
    SellerNotFound(SellerId),

    /// The referenced product does not exist (or is soft-deleted).
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The referenced order does not exist (or is soft-deleted).
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The referenced order item does not exist (or is soft-deleted).
    #[error("order item not found: {0}")]
    OrderItemNotFound(OrderItemId),

    /// The order request named product ids that resolve to no row.
    /// Partial fulfillment is not supported.
    #[error("order references unknown products: {product_ids:?}")]
    UnknownProducts { product_ids: Vec<ProductId> },

    /// The order request contained no lines.
    #[error("order must contain at least one line")]
    EmptyOrder,

    /// The requested target status has no transition mapped to it.
    #[error("cannot move an order item to the {status} status")]
    InvalidTargetStatus { status: OrderItemStatus },

    /// An entity-level guard rejected the operation.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The persistence layer failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse error categories, stable across variants, for callers that map
/// failures onto response classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The request itself is unacceptable; nothing was persisted.
    InvalidArgument,
    /// The operation is not permitted in the entity's current state.
    InvalidOperation,
    /// A backend failure unrelated to the request's validity.
    Internal,
}

impl ServiceError {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::CustomerNotFound(_)
            | ServiceError::SellerNotFound(_)
            | ServiceError::ProductNotFound(_)
            | ServiceError::OrderNotFound(_)
            | ServiceError::OrderItemNotFound(_) => ErrorKind::NotFound,

            ServiceError::UnknownProducts { .. }
            | ServiceError::EmptyOrder
            | ServiceError::InvalidTargetStatus { .. } => ErrorKind::InvalidArgument,

            ServiceError::Domain(DomainError::InvalidTransition { .. }) => {
                ErrorKind::InvalidOperation
            }
            ServiceError::Domain(_) => ErrorKind::InvalidArgument,

            // The conditional decrement losing the race is an ordinary
            // out-of-stock rejection from the caller's point of view.
            ServiceError::Store(StoreError::StockConflict { .. }) => ErrorKind::InvalidArgument,
            ServiceError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_not_found() {
        assert_eq!(
            ServiceError::CustomerNotFound(CustomerId::new(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ServiceError::OrderItemNotFound(OrderItemId::new(1)).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn validation_failures_map_to_invalid_argument() {
        assert_eq!(ServiceError::EmptyOrder.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            ServiceError::Domain(DomainError::InsufficientStock {
                available: 1,
                requested: 2,
            })
            .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            ServiceError::Store(StoreError::StockConflict {
                product_id: ProductId::new(1),
            })
            .kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn bad_transitions_map_to_invalid_operation() {
        let err = ServiceError::Domain(DomainError::InvalidTransition {
            current: OrderItemStatus::Pending,
            action: "ship",
        });
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn backend_failures_map_to_internal() {
        let err = ServiceError::Store(StoreError::Integrity("dangling row".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
