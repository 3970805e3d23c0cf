//! Use-case services for the commerce backend.
//!
//! Services validate input, orchestrate repository calls, and let the
//! entities enforce their own invariants. Every failure is surfaced to
//! the caller as a [`ServiceError`] whose [`ErrorKind`] is stable enough
//! for an outer layer to map onto response categories.

pub mod error;
pub mod order;
pub mod product;

pub use error::{ErrorKind, ServiceError};
pub use order::{OrderLine, OrderService};
pub use product::{NewProduct, ProductPatch, ProductService};
