use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{FixedOffset, NaiveDate};

use cashbook_core::{Account, LedgerError, LedgerResult, Money, MovementId};
use cashbook_ledger::{Balances, Closure, Movement, MovementFilter, Pagination};

use super::r#trait::{ClosureStore, FundsPolicy, MovementStore, Reconciliation};

fn poisoned<T>(_: PoisonError<T>) -> LedgerError {
    LedgerError::storage("lock poisoned")
}

#[derive(Debug, Default)]
struct Log {
    next_seq: u64,
    /// Commit order.
    entries: BTreeMap<u64, Movement>,
    index: HashMap<MovementId, u64>,
}

impl Log {
    fn get(&self, id: MovementId) -> Option<&Movement> {
        self.index.get(&id).and_then(|seq| self.entries.get(seq))
    }

    fn push(&mut self, movement: Movement) {
        self.next_seq += 1;
        self.index.insert(movement.id, self.next_seq);
        self.entries.insert(self.next_seq, movement);
    }

    fn remove(&mut self, id: MovementId) -> Option<Movement> {
        let seq = self.index.remove(&id)?;
        self.entries.remove(&seq)
    }
}

/// In-memory movement log with one balance lock per account.
///
/// Lock order is always cash, then bank, then the log. Writers on different
/// accounts do not contend on the balance locks.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    cash: Mutex<Money>,
    bank: Mutex<Money>,
    log: RwLock<Log>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load movements into the log without touching the cached balances.
    ///
    /// Used for bulk imports; follow with `reconcile(true)` to rebuild the cache.
    pub fn import_raw(&self, movements: Vec<Movement>) -> LedgerResult<()> {
        let mut log = self.log.write().map_err(poisoned)?;
        for m in &movements {
            if log.index.contains_key(&m.id) {
                return Err(LedgerError::validation(format!("duplicate movement id {}", m.id)));
            }
        }
        for m in movements {
            log.push(m);
        }
        Ok(())
    }

    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.log.read().map_err(poisoned)?.entries.len())
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, account: Account) -> &Mutex<Money> {
        match account {
            Account::Cash => &self.cash,
            Account::Bank => &self.bank,
        }
    }

    /// Lock the given accounts in `Account` order.
    fn lock_accounts(
        &self,
        accounts: &BTreeSet<Account>,
    ) -> LedgerResult<Vec<(Account, MutexGuard<'_, Money>)>> {
        accounts
            .iter()
            .map(|account| Ok((*account, self.slot(*account).lock().map_err(poisoned)?)))
            .collect()
    }
}

impl MovementStore for InMemoryMovementStore {
    fn append(&self, batch: Vec<Movement>, policy: FundsPolicy) -> LedgerResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let accounts: BTreeSet<Account> = batch.iter().map(|m| m.account).collect();
        let mut guards = self.lock_accounts(&accounts)?;

        let mut deltas = Vec::with_capacity(guards.len());
        for (account, guard) in guards.iter() {
            let account = *account;
            let on_account = batch.iter().filter(move |m| m.account == account);
            let delta: Money = on_account.clone().map(Movement::signed_amount).sum();

            if policy == FundsPolicy::RequireFunds {
                let debits: Money = on_account.filter(|m| !m.is_credit).map(|m| m.amount).sum();
                if debits.is_positive() && (**guard + delta).is_negative() {
                    return Err(LedgerError::InsufficientFunds {
                        account,
                        requested: debits,
                        available: **guard,
                    });
                }
            }
            deltas.push(delta);
        }

        {
            let mut log = self.log.write().map_err(poisoned)?;
            for m in &batch {
                if log.index.contains_key(&m.id) {
                    return Err(LedgerError::validation(format!(
                        "duplicate movement id {}",
                        m.id
                    )));
                }
            }
            for m in batch {
                log.push(m);
            }
        }

        for ((_, guard), delta) in guards.iter_mut().zip(deltas) {
            **guard += delta;
        }
        Ok(())
    }

    fn reverse(&self, id: MovementId) -> LedgerResult<Movement> {
        let missing = || LedgerError::not_found(format!("movement {id}"));

        let account = {
            let log = self.log.read().map_err(poisoned)?;
            log.get(id).map(|m| m.account).ok_or_else(missing)?
        };

        let mut balance = self.slot(account).lock().map_err(poisoned)?;
        // A concurrent reversal may have won the race since the lookup.
        let removed = {
            let mut log = self.log.write().map_err(poisoned)?;
            log.remove(id).ok_or_else(missing)?
        };
        *balance -= removed.signed_amount();
        Ok(removed)
    }

    fn get(&self, id: MovementId) -> LedgerResult<Option<Movement>> {
        let log = self.log.read().map_err(poisoned)?;
        Ok(log.get(id).cloned())
    }

    fn movements(&self, filter: &MovementFilter, offset: FixedOffset) -> LedgerResult<Vec<Movement>> {
        let log = self.log.read().map_err(poisoned)?;
        Ok(log
            .entries
            .values()
            .filter(|m| filter.matches(m, offset))
            .cloned()
            .collect())
    }

    fn current_balances(&self) -> LedgerResult<Balances> {
        let cash = self.cash.lock().map_err(poisoned)?;
        let bank = self.bank.lock().map_err(poisoned)?;
        Ok(Balances::new(*cash, *bank))
    }

    fn reconcile(&self, repair: bool) -> LedgerResult<Reconciliation> {
        let mut cash = self.cash.lock().map_err(poisoned)?;
        let mut bank = self.bank.lock().map_err(poisoned)?;
        let log = self.log.read().map_err(poisoned)?;

        let cached = Balances::new(*cash, *bank);
        let recomputed = Balances::from_movements(log.entries.values());
        if repair {
            *cash = recomputed.cash;
            *bank = recomputed.bank;
        }
        Ok(Reconciliation { cached, recomputed })
    }
}

/// In-memory closure store keyed by date.
#[derive(Debug, Default)]
pub struct InMemoryClosureStore {
    closures: Mutex<BTreeMap<NaiveDate, Closure>>,
}

impl InMemoryClosureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClosureStore for InMemoryClosureStore {
    fn insert(&self, closure: Closure) -> LedgerResult<Closure> {
        let mut closures = self.closures.lock().map_err(poisoned)?;
        if closures.contains_key(&closure.date) {
            return Err(LedgerError::AlreadyClosed(closure.date));
        }
        if let Some(&latest) = closures.keys().next_back() {
            if latest > closure.date {
                return Err(out_of_order(closure.date, latest));
            }
        }
        closures.insert(closure.date, closure.clone());
        Ok(closure)
    }

    fn get(&self, date: NaiveDate) -> LedgerResult<Option<Closure>> {
        let closures = self.closures.lock().map_err(poisoned)?;
        Ok(closures.get(&date).cloned())
    }

    fn latest(&self) -> LedgerResult<Option<Closure>> {
        let closures = self.closures.lock().map_err(poisoned)?;
        Ok(closures.values().next_back().cloned())
    }

    fn latest_before(&self, date: NaiveDate) -> LedgerResult<Option<Closure>> {
        let closures = self.closures.lock().map_err(poisoned)?;
        Ok(closures.range(..date).next_back().map(|(_, c)| c.clone()))
    }

    fn list(&self, pagination: Pagination) -> LedgerResult<Vec<Closure>> {
        let closures = self.closures.lock().map_err(poisoned)?;
        Ok(pagination.apply(closures.values().rev().cloned().collect()))
    }
}

fn out_of_order(date: NaiveDate, latest: NaiveDate) -> LedgerError {
    LedgerError::validation(format!(
        "cannot close {date}: {latest} is already closed and closures must follow date order"
    ))
}
