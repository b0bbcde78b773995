//! Order lifecycle transitions.

mod state_machine;
mod transition;

pub use state_machine::OrderStateMachine;
pub use transition::Transition;

use thiserror::Error;

/// Errors that can occur before an order transition reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Carrier ratings are whole numbers from 1 to 5.
    #[error("Invalid rating: {score} (must be between 1 and 5)")]
    InvalidRating { score: u8 },
}
