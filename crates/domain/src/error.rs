//! Domain error types.

use order_store::StoreError;
use thiserror::Error;

use crate::order::OrderError;

/// Errors that can occur during order lifecycle operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order store.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),

    /// The request was rejected before reaching the store.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}
