use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use cashbook_core::{LedgerResult, MovementId};
use cashbook_ledger::{Balances, Closure, Movement, MovementFilter, Pagination};

/// Whether an append must respect the no-overdraft rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundsPolicy {
    /// Reject the batch if any debited account would go negative.
    RequireFunds,
    /// Accept the batch regardless of resulting balances (imports, corrections).
    Unchecked,
}

/// Cached balances compared with a full re-scan of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Cache contents before the scan.
    pub cached: Balances,
    /// Signed sum of every movement in the log.
    pub recomputed: Balances,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.cached == self.recomputed
    }
}

/// Movement log plus its materialized per-account balances.
///
/// The log is the source of truth; balances are a cache kept fresh on every
/// append and reversal.
///
/// ## Atomicity
///
/// - `append` commits a whole batch or nothing. The funds check, the log write
///   and the balance update happen inside one critical section per affected
///   account, so two debits racing for the same funds cannot both pass.
/// - A batch touching both accounts (a transfer) is observed by
///   `current_balances` either fully applied or not at all.
/// - `reconcile` excludes concurrent appends and reversals for its duration.
pub trait MovementStore: Send + Sync {
    /// Commit a batch of validated movements and their balance deltas.
    fn append(&self, batch: Vec<Movement>, policy: FundsPolicy) -> LedgerResult<()>;

    /// Remove a movement and apply the inverse of its balance delta.
    ///
    /// Fails with `NotFound` if the id is unknown.
    fn reverse(&self, id: MovementId) -> LedgerResult<Movement>;

    fn get(&self, id: MovementId) -> LedgerResult<Option<Movement>>;

    /// Movements matching `filter`, oldest first (commit order).
    fn movements(&self, filter: &MovementFilter, offset: FixedOffset) -> LedgerResult<Vec<Movement>>;

    /// Cached balances; never recomputes.
    fn current_balances(&self) -> LedgerResult<Balances>;

    /// Re-scan the full log under exclusive access. When `repair` is set the
    /// cache is overwritten with the recomputed values.
    fn reconcile(&self, repair: bool) -> LedgerResult<Reconciliation>;
}

impl<S> MovementStore for Arc<S>
where
    S: MovementStore + ?Sized,
{
    fn append(&self, batch: Vec<Movement>, policy: FundsPolicy) -> LedgerResult<()> {
        (**self).append(batch, policy)
    }

    fn reverse(&self, id: MovementId) -> LedgerResult<Movement> {
        (**self).reverse(id)
    }

    fn get(&self, id: MovementId) -> LedgerResult<Option<Movement>> {
        (**self).get(id)
    }

    fn movements(&self, filter: &MovementFilter, offset: FixedOffset) -> LedgerResult<Vec<Movement>> {
        (**self).movements(filter, offset)
    }

    fn current_balances(&self) -> LedgerResult<Balances> {
        (**self).current_balances()
    }

    fn reconcile(&self, repair: bool) -> LedgerResult<Reconciliation> {
        (**self).reconcile(repair)
    }
}

/// Persisted daily closures, at most one per date.
pub trait ClosureStore: Send + Sync {
    /// Persist a closure. Fails with `AlreadyClosed` if one exists for its date;
    /// of two concurrent inserts for a date exactly one succeeds. Closures are
    /// append-only in date order: a date earlier than the latest stored closure
    /// is a `Validation` error.
    fn insert(&self, closure: Closure) -> LedgerResult<Closure>;

    fn get(&self, date: NaiveDate) -> LedgerResult<Option<Closure>>;

    /// The most recently dated closure.
    fn latest(&self) -> LedgerResult<Option<Closure>>;

    /// Most recent closure strictly before `date`.
    fn latest_before(&self, date: NaiveDate) -> LedgerResult<Option<Closure>>;

    /// Closures newest first.
    fn list(&self, pagination: Pagination) -> LedgerResult<Vec<Closure>>;
}

impl<S> ClosureStore for Arc<S>
where
    S: ClosureStore + ?Sized,
{
    fn insert(&self, closure: Closure) -> LedgerResult<Closure> {
        (**self).insert(closure)
    }

    fn get(&self, date: NaiveDate) -> LedgerResult<Option<Closure>> {
        (**self).get(date)
    }

    fn latest(&self) -> LedgerResult<Option<Closure>> {
        (**self).latest()
    }

    fn latest_before(&self, date: NaiveDate) -> LedgerResult<Option<Closure>> {
        (**self).latest_before(date)
    }

    fn list(&self, pagination: Pagination) -> LedgerResult<Vec<Closure>> {
        (**self).list(pagination)
    }
}
