//! Order service orchestrating validation, state transitions, and storage.

use common::{OrderId, Page};

use crate::error::DomainError;
use crate::repository::OrderRepository;

use super::{
    AddService, CreateOrder, NewOrder, Order, OrderState, Service, validate_create,
    validate_service_value,
};

/// Service for managing orders.
///
/// Every method is one business transaction: pure checks on the aggregate
/// followed by one or two repository calls. Failures are returned as-is and
/// never retried here.
pub struct OrderService<R: OrderRepository> {
    repository: R,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service backed by the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates and stores a new order.
    ///
    /// Nothing is written when validation fails.
    #[tracing::instrument(skip(self, cmd), fields(lab = %cmd.lab), err)]
    pub async fn create(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        validate_create(&cmd)?;

        let order = self.repository.create(NewOrder::from_command(cmd)).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id(),
            services = order.service_count(),
            total = order.total_value(),
            "order created"
        );
        Ok(order)
    }

    /// Moves an order to its next workflow state and saves it.
    ///
    /// Calling this twice never yields the same state twice: each call either
    /// advances the order or fails.
    #[tracing::instrument(skip(self), err)]
    pub async fn advance(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.load(order_id).await?;
        let previous = order.state();
        let next = order.advance()?;

        let saved = self.repository.save(&order).await?;

        metrics::counter!("orders_advanced_total", "state" => next.as_str()).increment(1);
        tracing::info!(%order_id, from = %previous, to = %next, "order advanced");
        Ok(saved)
    }

    /// Lists active orders, optionally filtered by workflow state.
    #[tracing::instrument(skip(self), err)]
    pub async fn list(
        &self,
        state: Option<OrderState>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self.repository.find(state, page).await?)
    }

    /// Appends a service to an existing order and saves it.
    ///
    /// The new total is not re-validated and duplicate names are allowed, but
    /// the appended value itself must be finite.
    #[tracing::instrument(skip(self), err)]
    pub async fn add_service(&self, cmd: AddService) -> Result<Order, DomainError> {
        validate_service_value(&cmd.service)?;
        let mut order = self.load(cmd.order_id).await?;
        order.add_service(Service::from_input(cmd.service));

        let saved = self.repository.save(&order).await?;

        metrics::counter!("order_services_added_total").increment(1);
        tracing::info!(
            order_id = %cmd.order_id,
            services = saved.service_count(),
            "service added to order"
        );
        Ok(saved)
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self), err)]
    pub async fn get(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.load(order_id).await
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.repository
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))
    }
}
