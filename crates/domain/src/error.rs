//! Domain error types.

use common::OrderId;
use thiserror::Error;

use crate::order::OrderError;
use crate::repository::RepositoryError;

/// Errors that can occur during order service operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A business rule rejected the operation.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// No order with this identifier exists.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The repository failed.
    #[error("Storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

impl DomainError {
    /// Returns true for creation-time validation failures.
    pub fn is_invalid_order(&self) -> bool {
        matches!(self, DomainError::Order(err) if err.is_invalid_order())
    }

    /// Returns true when an order could not advance past a terminal state.
    pub fn is_illegal_transition(&self) -> bool {
        matches!(
            self,
            DomainError::Order(OrderError::IllegalTransition { .. })
        )
    }
}
