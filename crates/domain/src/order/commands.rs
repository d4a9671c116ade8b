//! Order commands and the fully-initialized creation payload.

use common::OrderId;

use super::{OrderState, OrderStatus, Service, ServiceInput};

/// Command to create a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrder {
    /// Laboratory performing the services.
    pub lab: String,

    /// Patient the samples belong to.
    pub patient: String,

    /// Customer paying for the order.
    pub customer: String,

    /// Requested services, in display order.
    pub services: Vec<ServiceInput>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(
        lab: impl Into<String>,
        patient: impl Into<String>,
        customer: impl Into<String>,
        services: Vec<ServiceInput>,
    ) -> Self {
        Self {
            lab: lab.into(),
            patient: patient.into(),
            customer: customer.into(),
            services,
        }
    }
}

/// Command to append a service to an existing order.
#[derive(Debug, Clone, PartialEq)]
pub struct AddService {
    /// The order to add the service to.
    pub order_id: OrderId,

    /// The service to append.
    pub service: ServiceInput,
}

impl AddService {
    /// Creates a new AddService command.
    pub fn new(order_id: OrderId, service: ServiceInput) -> Self {
        Self { order_id, service }
    }
}

/// A validated order that has not been stored yet.
///
/// Every field is set explicitly: the workflow starts at `Created`, the order
/// is `Active`, and each service carries a concrete status. Repositories turn
/// this into an [`Order`](super::Order) by assigning identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub lab: String,
    pub patient: String,
    pub customer: String,
    pub state: OrderState,
    pub status: OrderStatus,
    pub services: Vec<Service>,
}

impl NewOrder {
    /// Builds the creation payload from a command, filling in every default.
    ///
    /// Callers are expected to have validated the command first.
    pub fn from_command(cmd: CreateOrder) -> Self {
        Self {
            lab: cmd.lab,
            patient: cmd.patient,
            customer: cmd.customer,
            state: OrderState::Created,
            status: OrderStatus::Active,
            services: cmd.services.into_iter().map(Service::from_input).collect(),
        }
    }
}
