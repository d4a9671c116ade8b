//! Order workflow state machine and visibility status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// Position of an order in its processing workflow.
///
/// State transitions:
/// ```text
/// Created ──► Analysis ──► Completed
/// ```
/// Orders only ever move forward; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Order was registered and awaits analysis.
    #[default]
    Created,

    /// Samples are being analysed.
    Analysis,

    /// All work is done (terminal state).
    Completed,
}

impl OrderState {
    /// Every state, in workflow order.
    pub const ALL: [OrderState; 3] = [
        OrderState::Created,
        OrderState::Analysis,
        OrderState::Completed,
    ];

    /// Returns the state that follows this one, if any.
    pub fn successor(&self) -> Option<OrderState> {
        match self {
            OrderState::Created => Some(OrderState::Analysis),
            OrderState::Analysis => Some(OrderState::Completed),
            OrderState::Completed => None,
        }
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::Analysis => "ANALYSIS",
            OrderState::Completed => "COMPLETED",
        }
    }
}

/// Computes the state an order moves to when advanced.
///
/// Fails with [`OrderError::IllegalTransition`] when `current` has no successor.
pub fn next_state(current: OrderState) -> Result<OrderState, OrderError> {
    current.successor().ok_or(OrderError::IllegalTransition {
        current_state: current,
    })
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown state or status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for OrderState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderState::Created),
            "ANALYSIS" => Ok(OrderState::Analysis),
            "COMPLETED" => Ok(OrderState::Completed),
            other => Err(ParseEnumError {
                kind: "order state",
                value: other.to_string(),
            }),
        }
    }
}

/// Visibility flag of an order, independent of its workflow state.
///
/// Deleted orders are hidden from listings; nothing is ever hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Active,
    Deleted,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "ACTIVE",
            OrderStatus::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(OrderStatus::Active),
            "DELETED" => Ok(OrderStatus::Deleted),
            other => Err(ParseEnumError {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}
