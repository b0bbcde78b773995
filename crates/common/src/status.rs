//! Order lifecycle status and product category.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a persisted literal does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──claim──► Selected ──complete──► Delivered
///    ▲                  │
///    └─────release──────┘
/// Pending ──cancel──► Cancelled
/// ```
///
/// The string forms are the persisted contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed and waiting for a carrier.
    #[default]
    Pending,

    /// Claimed by a carrier, out for delivery.
    Selected,

    /// Handed over to the customer (terminal state).
    Delivered,

    /// Withdrawn by the customer before any carrier claimed it (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Selected,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true if a carrier may claim the order in this state.
    pub fn can_claim(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the holding carrier may hand the order back.
    pub fn can_release(&self) -> bool {
        matches!(self, OrderStatus::Selected)
    }

    /// Returns true if the order may be marked delivered.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Selected)
    }

    /// Returns true if the customer may cancel.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the carrier may be rated.
    pub fn can_rate(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the persisted literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Selected => "Selected",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

/// Catalog category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductCategory {
    Fruit,
    Vegetable,
}

impl ProductCategory {
    /// Returns the persisted literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Fruit => "FRUIT",
            ProductCategory::Vegetable => "VEGETABLE",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRUIT" => Ok(ProductCategory::Fruit),
            "VEGETABLE" => Ok(ProductCategory::Vegetable),
            other => Err(ParseEnumError {
                kind: "product category",
                value: other.to_string(),
            }),
        }
    }
}
