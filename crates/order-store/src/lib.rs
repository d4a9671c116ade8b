//! Order repository implementations.
//!
//! - [`InMemoryOrderRepository`] keeps orders in process memory (tests, local runs)
//! - [`PostgresOrderRepository`] stores orders in a PostgreSQL `orders` table

pub mod memory;
pub mod postgres;

pub use domain::{OrderRepository, RepositoryError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
