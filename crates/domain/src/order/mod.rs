//! Order aggregate and related types.

mod aggregate;
mod commands;
mod rules;
mod service;
mod state;
mod value_objects;

pub use aggregate::{Order, OrderRecord};
pub use commands::{AddService, CreateOrder, NewOrder};
pub use rules::{validate_create, validate_parties, validate_service_value, validate_services};
pub use service::OrderService;
pub use state::{OrderState, OrderStatus, ParseEnumError, next_state};
pub use value_objects::{Service, ServiceInput, ServiceStatus, total_value};

use thiserror::Error;

/// Errors raised by order rules and the order state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// The order was submitted without any service.
    #[error("Order must have at least one service")]
    NoServices,

    /// The services of the order don't add up to a positive amount.
    #[error("Order total value must be greater than zero (got {total})")]
    NonPositiveTotal { total: f64 },

    /// A service value, or the sum of them, is infinite or NaN.
    #[error("Service values must be finite numbers (got {value})")]
    NonFiniteValue { value: f64 },

    /// A required party identifier is blank.
    #[error("Order field '{field}' is required")]
    MissingField { field: &'static str },

    /// The order is in a state with no successor.
    #[error("Order cannot advance from state {current_state}")]
    IllegalTransition { current_state: OrderState },
}

impl OrderError {
    /// Returns true for failures of creation-time validation.
    pub fn is_invalid_order(&self) -> bool {
        matches!(
            self,
            OrderError::NoServices
                | OrderError::NonPositiveTotal { .. }
                | OrderError::NonFiniteValue { .. }
                | OrderError::MissingField { .. }
        )
    }
}
