use common::ParseEnumError;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
///
/// Lost races are not errors: guarded writes report them as `Ok(false)` and
/// a checkout that runs out of stock reports `CommitOutcome::InsufficientStock`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order was rejected before touching the store.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// The product was rejected before touching the store.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// A carrier rating outside 1..=5.
    #[error("Invalid rating: {0} (must be between 1 and 5)")]
    InvalidRating(u8),

    /// A persisted literal could not be decoded.
    #[error("Corrupt row: {0}")]
    CorruptRow(#[from] ParseEnumError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
