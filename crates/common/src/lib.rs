//! Shared types for the lab order backend.

mod types;

pub use types::{OrderId, Page, Version};
