use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, Page};
use domain::{NewOrder, Order, OrderRepository, OrderState, RepositoryError};
use tokio::sync::RwLock;

/// In-memory order repository.
///
/// Orders are kept in creation order and the handle is cheap to clone; all
/// clones share the same storage. Saves use the same version check as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders, deleted ones included.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns true if nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Stores an already materialized order as-is.
    ///
    /// Useful for seeding fixtures, e.g. soft-deleted orders.
    pub async fn insert(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    /// Removes all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

/// Clamps a possibly negative paging bound to a usable count.
fn clamp(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let order = Order::from_new(OrderId::new(), new_order, Utc::now());
        self.orders.write().await.push(order.clone());
        tracing::debug!(order_id = %order.id(), "order stored in memory");
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id() == id).cloned())
    }

    async fn find(
        &self,
        state: Option<OrderState>,
        page: Page,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.is_active())
            .filter(|o| state.is_none_or(|s| o.state() == s))
            .skip(clamp(page.offset()))
            .take(clamp(page.limit))
            .cloned()
            .collect())
    }

    async fn save(&self, order: &Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;

        let stored = orders
            .iter_mut()
            .find(|o| o.id() == order.id())
            .ok_or(RepositoryError::OrderMissing(order.id()))?;

        if stored.version() != order.version() {
            return Err(RepositoryError::ConcurrencyConflict {
                order_id: order.id(),
                expected: order.version(),
                actual: stored.version(),
            });
        }

        let mut saved = order.clone();
        saved.mark_saved(Utc::now());
        *stored = saved.clone();
        Ok(saved)
    }
}
