//! Cash/bank ledger domain.
//!
//! Pure domain logic only: no IO, no locking, no persistence concerns.

pub mod balances;
pub mod closure;
pub mod movement;
pub mod query;

pub use balances::Balances;
pub use closure::{CloseDay, Closure, ClosureOutcome, DailyTotals};
pub use movement::{
    AdjustmentDirection, Movement, MovementDraft, MovementKind, PurchaseRef, SaleRef,
    TransferDirection,
};
pub use query::{MovementFilter, MovementPage, Pagination};
