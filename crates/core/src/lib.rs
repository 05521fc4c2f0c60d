//! `cashbook-core`: ledger foundation building blocks.
//!
//! This crate contains **pure** primitives shared by the ledger domain and the
//! storage/service layers (no IO, no locking).

pub mod account;
pub mod clock;
pub mod error;
pub mod id;
pub mod money;

pub use account::Account;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LedgerError, LedgerResult};
pub use id::{MovementId, UserId};
pub use money::Money;
