//! Daily cash closure.
//!
//! Closing a day reads the day's movements and the previous closure, computes the
//! expected balances and stores an immutable [`Closure`]. Uniqueness per date is
//! enforced by the [`ClosureStore`] insert, so of two racing calls exactly one wins.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use cashbook_core::{Clock, LedgerError, LedgerResult, Money, UserId};
use cashbook_ledger::{CloseDay, Closure, ClosureOutcome, DailyTotals, MovementFilter, Pagination};

use crate::config::ServiceConfig;
use crate::store::{ClosureStore, MovementStore};

#[derive(Debug)]
pub struct ClosureEngine<M, C> {
    movements: M,
    closures: C,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl<M, C> ClosureEngine<M, C>
where
    M: MovementStore,
    C: ClosureStore,
{
    pub fn new(movements: M, closures: C, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        Self {
            movements,
            closures,
            clock,
            config,
        }
    }

    /// Today's date in the business time zone.
    pub fn today(&self) -> NaiveDate {
        self.clock
            .now()
            .with_timezone(&self.config.business_offset)
            .date_naive()
    }

    /// Reconcile `date` against a physical cash count and persist the result.
    ///
    /// Opening balances are the expected balances of the latest closure before
    /// `date`, or zero when there is none. Days close in date order, so `date`
    /// may not precede an existing closure.
    pub fn close_day(
        &self,
        date: NaiveDate,
        counted_cash: Money,
        notes: impl Into<String>,
        actor: Option<UserId>,
    ) -> LedgerResult<Closure> {
        let today = self.today();
        if date > today {
            return Err(LedgerError::validation(format!(
                "cannot close {date}: it is after today ({today})"
            )));
        }
        if self.closures.get(date)?.is_some() {
            return Err(LedgerError::AlreadyClosed(date));
        }
        if let Some(latest) = self.closures.latest()? {
            if latest.date > date {
                return Err(LedgerError::validation(format!(
                    "cannot close {date}: {} is already closed and closures must follow date order",
                    latest.date
                )));
            }
        }

        let opening = self
            .closures
            .latest_before(date)?
            .map(|prior| prior.expected())
            .unwrap_or_default();
        let totals = self.day_summary(date)?;

        let closure = Closure::compute(
            CloseDay {
                date,
                counted_cash,
                notes: notes.into(),
                closed_by: actor,
                closed_at: self.clock.now(),
            },
            opening,
            totals,
        )?;

        let stored = match self.closures.insert(closure) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%date, error = %err, "closure rejected at commit");
                return Err(err);
            }
        };

        info!(
            %date,
            expected_cash = %stored.expected_cash,
            expected_bank = %stored.expected_bank,
            counted_cash = %stored.counted_cash,
            variance = %stored.cash_variance,
            movements = stored.totals.movement_count,
            actor = ?actor,
            "day closed"
        );
        if !matches!(stored.outcome(), ClosureOutcome::Balanced) {
            warn!(%date, variance = %stored.cash_variance, "cash count does not match expected");
        }
        Ok(stored)
    }

    pub fn get_closure(&self, date: NaiveDate) -> LedgerResult<Option<Closure>> {
        self.closures.get(date)
    }

    /// Closures newest first.
    pub fn list_closures(&self, pagination: Pagination) -> LedgerResult<Vec<Closure>> {
        self.closures.list(pagination)
    }

    /// Per-category totals for `date` without persisting anything.
    pub fn day_summary(&self, date: NaiveDate) -> LedgerResult<DailyTotals> {
        let offset = self.config.business_offset;
        let movements = self.movements.movements(&MovementFilter::on(date), offset)?;
        Ok(DailyTotals::aggregate(date, offset, &movements))
    }
}
