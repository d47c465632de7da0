//! Storage adapters for the purchase transaction repository.
//!
//! [`InMemoryUnitOfWork`] keeps everything in process memory and is meant for
//! tests and local runs. [`PostgresUnitOfWork`] maps each scope onto one
//! PostgreSQL transaction.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StorageError;
pub use memory::{InMemoryScope, InMemoryUnitOfWork};
pub use postgres::{PostgresScope, PostgresUnitOfWork};
