//! Creation-time validation rules.
//!
//! These checks only run when an order is created. Services appended later
//! through `add_service` are not re-validated.

use super::{CreateOrder, OrderError, ServiceInput};

/// Checks that an order has at least one service and a positive total value.
///
/// Individual values may be zero or negative as long as the sum is finite and
/// strictly greater than zero.
pub fn validate_services(services: &[ServiceInput]) -> Result<(), OrderError> {
    if services.is_empty() {
        return Err(OrderError::NoServices);
    }

    let total: f64 = services.iter().map(|service| service.value).sum();

    // Any infinite or NaN value makes the sum non-finite.
    if !total.is_finite() {
        return Err(OrderError::NonFiniteValue { value: total });
    }

    if total > 0.0 {
        Ok(())
    } else {
        Err(OrderError::NonPositiveTotal { total })
    }
}

/// Checks that a single service carries a finite value.
///
/// Applied to services appended after creation, whose totals are not checked.
pub fn validate_service_value(service: &ServiceInput) -> Result<(), OrderError> {
    if service.value.is_finite() {
        Ok(())
    } else {
        Err(OrderError::NonFiniteValue {
            value: service.value,
        })
    }
}

/// Checks that the lab, patient, and customer identifiers are present.
pub fn validate_parties(cmd: &CreateOrder) -> Result<(), OrderError> {
    for (field, value) in [
        ("lab", &cmd.lab),
        ("patient", &cmd.patient),
        ("customer", &cmd.customer),
    ] {
        if value.trim().is_empty() {
            return Err(OrderError::MissingField { field });
        }
    }
    Ok(())
}

/// Runs every creation-time rule against a command.
pub fn validate_create(cmd: &CreateOrder) -> Result<(), OrderError> {
    validate_parties(cmd)?;
    validate_services(&cmd.services)
}
