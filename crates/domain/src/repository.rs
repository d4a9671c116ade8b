//! Storage capability the order service depends on.

use async_trait::async_trait;
use common::{OrderId, Page, Version};
use thiserror::Error;

use crate::order::{NewOrder, Order, OrderState};

/// Errors reported by order repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The order disappeared between load and save.
    #[error("Order {0} no longer exists")]
    OrderMissing(OrderId),

    /// The stored order changed since it was loaded.
    #[error(
        "Concurrency conflict for order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// The backing store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Wraps any backend error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        RepositoryError::Backend(err.to_string())
    }
}

/// Durable storage of order aggregates.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order, assigning its identifier, and returns it.
    async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError>;

    /// Loads an order by identifier, regardless of its visibility status.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Lists `Active` orders, optionally restricted to one workflow state.
    ///
    /// Orders are returned in creation order, skipping `page.offset()`
    /// records and returning at most `page.limit`.
    async fn find(
        &self,
        state: Option<OrderState>,
        page: Page,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Overwrites the state, status, and services of a stored order.
    ///
    /// The write only succeeds if the stored version still equals
    /// `order.version()`; the returned order carries the bumped version.
    async fn save(&self, order: &Order) -> Result<Order, RepositoryError>;
}
