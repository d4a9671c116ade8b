//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, Version};
use serde::{Deserialize, Serialize};

use super::{NewOrder, OrderError, OrderState, OrderStatus, Service, next_state};

/// Order aggregate root.
///
/// Groups the parties of a lab order, its workflow position, its visibility
/// status, and the services requested for the patient. The aggregate is the
/// unit of consistency: it is loaded, mutated in memory, and saved as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier, assigned by the repository on creation.
    id: OrderId,

    /// Stored version for optimistic concurrency.
    version: Version,

    lab: String,
    patient: String,
    customer: String,

    /// Current workflow state.
    state: OrderState,

    /// Visibility flag.
    status: OrderStatus,

    /// Attached services, in insertion order.
    services: Vec<Service>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat persistence shape of an [`Order`].
///
/// Storage backends read rows into this record and convert it back into an
/// aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub version: Version,
    pub lab: String,
    pub patient: String,
    pub customer: String,
    pub state: OrderState,
    pub status: OrderStatus,
    pub services: Vec<Service>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: record.id,
            version: record.version,
            lab: record.lab,
            patient: record.patient,
            customer: record.customer,
            state: record.state,
            status: record.status,
            services: record.services,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Order> for OrderRecord {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            version: order.version,
            lab: order.lab,
            patient: order.patient,
            customer: order.customer,
            state: order.state,
            status: order.status,
            services: order.services,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl Order {
    /// Materializes a stored order from a creation payload.
    ///
    /// Used by repositories once they have picked an identifier.
    pub fn from_new(id: OrderId, new_order: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            version: Version::first(),
            lab: new_order.lab,
            patient: new_order.patient,
            customer: new_order.customer,
            state: new_order.state,
            status: new_order.status,
            services: new_order.services,
            created_at: now,
            updated_at: now,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn lab(&self) -> &str {
        &self.lab
    }

    pub fn patient(&self) -> &str {
        &self.patient
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Returns the current workflow state.
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns the visibility status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the attached services in insertion order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Returns the sum of all service values.
    pub fn total_value(&self) -> f64 {
        super::total_value(self.services.iter().map(|service| &service.value))
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Returns true if the order reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// Mutations. Persisting the result is the caller's job.
impl Order {
    /// Moves the order to its next workflow state.
    ///
    /// On failure the aggregate is left untouched.
    pub fn advance(&mut self) -> Result<OrderState, OrderError> {
        let next = next_state(self.state)?;
        self.state = next;
        Ok(next)
    }

    /// Appends a service. The order total is not re-validated.
    pub fn add_service(&mut self, service: Service) {
        self.services.push(service);
    }

    /// Sets the visibility status.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Records a successful save: bumps the version and the update timestamp.
    ///
    /// Only repositories should call this.
    pub fn mark_saved(&mut self, now: DateTime<Utc>) {
        self.version = self.version.next();
        self.updated_at = now;
    }
}
