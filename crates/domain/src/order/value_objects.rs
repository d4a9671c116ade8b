//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

/// Completion status of a single lab service.
///
/// No transition rule is enforced between the two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[default]
    Pending,
    Done,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Pending => "PENDING",
            ServiceStatus::Done => "DONE",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lab service as supplied by a caller, before defaults are filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInput {
    /// Label of the requested lab service.
    pub name: String,

    /// Monetary value. Individual values may be zero or negative.
    pub value: f64,

    /// Explicit status, `Pending` when omitted.
    #[serde(default)]
    pub status: Option<ServiceStatus>,
}

impl ServiceInput {
    /// Creates an input with no explicit status.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            status: None,
        }
    }

    /// Sets an explicit status.
    pub fn with_status(mut self, status: ServiceStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A billable lab service attached to an order.
///
/// Services are value objects: they have no identity of their own and are
/// compared by content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub value: f64,
    pub status: ServiceStatus,
}

impl Service {
    /// Creates a fully initialized service.
    pub fn new(name: impl Into<String>, value: f64, status: ServiceStatus) -> Self {
        Self {
            name: name.into(),
            value,
            status,
        }
    }

    /// Builds a service from caller input, defaulting the status to `Pending`.
    pub fn from_input(input: ServiceInput) -> Self {
        Self {
            name: input.name,
            value: input.value,
            status: input.status.unwrap_or_default(),
        }
    }

    /// Returns true once the service has been performed.
    pub fn is_done(&self) -> bool {
        self.status == ServiceStatus::Done
    }
}

impl From<ServiceInput> for Service {
    fn from(input: ServiceInput) -> Self {
        Self::from_input(input)
    }
}

/// Sums the values of a sequence of services.
pub fn total_value<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    values.into_iter().sum()
}
