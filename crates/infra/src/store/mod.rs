//! Movement log, balance cache and closure persistence.
//!
//! The traits make no storage assumptions; the in-memory implementations back
//! the service and the tests.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryClosureStore, InMemoryMovementStore};
pub use r#trait::{ClosureStore, FundsPolicy, MovementStore, Reconciliation};
