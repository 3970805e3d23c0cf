//! Order-line status state machine.

use serde::{Deserialize, Serialize};

/// The status of a single order line.
///
/// Transitions:
/// ```text
/// Pending ──► Confirmed ──► Shipped ──► Delivered
///    │            │
///    └────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemStatus {
    /// Placed but not yet acknowledged by the seller.
    #[default]
    Pending,

    /// Acknowledged by the seller.
    Confirmed,

    /// Handed to the carrier.
    Shipped,

    /// Received by the customer (terminal).
    Delivered,

    /// Withdrawn before shipping (terminal).
    Cancelled,
}

impl OrderItemStatus {
    /// Returns true if the line can be confirmed from this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderItemStatus::Pending)
    }

    /// Returns true if the line can be shipped from this status.
    pub fn can_ship(&self) -> bool {
        matches!(self, OrderItemStatus::Confirmed)
    }

    /// Returns true if the line can be delivered from this status.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderItemStatus::Shipped)
    }

    /// Returns true if the line can be cancelled from this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderItemStatus::Pending | OrderItemStatus::Confirmed)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderItemStatus::Delivered | OrderItemStatus::Cancelled)
    }

    /// Returns the status in its persisted text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "PENDING",
            OrderItemStatus::Confirmed => "CONFIRMED",
            OrderItemStatus::Shipped => "SHIPPED",
            OrderItemStatus::Delivered => "DELIVERED",
            OrderItemStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses the persisted text form back into a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderItemStatus::Pending),
            "CONFIRMED" => Some(OrderItemStatus::Confirmed),
            "SHIPPED" => Some(OrderItemStatus::Shipped),
            "DELIVERED" => Some(OrderItemStatus::Delivered),
            "CANCELLED" => Some(OrderItemStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
