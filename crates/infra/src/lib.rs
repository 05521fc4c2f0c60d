//! Infrastructure layer: storage, services and their configuration.

pub mod closure_engine;
pub mod config;
pub mod ledger_service;
pub mod store;


pub use closure_engine::ClosureEngine;
pub use config::ServiceConfig;
pub use ledger_service::LedgerService;
pub use store::{
    ClosureStore, FundsPolicy, InMemoryClosureStore, InMemoryMovementStore, MovementStore,
    Reconciliation,
};
