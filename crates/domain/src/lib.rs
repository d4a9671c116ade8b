//! Domain layer for the lab order backend.
//!
//! This crate provides:
//! - The Order aggregate with its services, workflow state, and status
//! - Creation-time validation rules and the forward-only state machine
//! - The `OrderRepository` storage capability
//! - `OrderService`, the entry point for order lifecycle operations

pub mod error;
pub mod order;
pub mod repository;

pub use error::DomainError;
pub use order::{
    AddService, CreateOrder, NewOrder, Order, OrderError, OrderRecord, OrderService, OrderState,
    OrderStatus, ParseEnumError, Service, ServiceInput, ServiceStatus, next_state,
    validate_services,
};
pub use repository::{OrderRepository, RepositoryError};
