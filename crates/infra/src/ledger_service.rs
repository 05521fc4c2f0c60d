//! Transactional ledger API.
//!
//! `LedgerService` turns business events (a sale paid, a deposit, a manual
//! correction) into validated movements and commits them through a
//! [`MovementStore`]. All checks run before anything is written; the store makes
//! the funds check and the write one atomic step.

use std::sync::Arc;

use tracing::{error, info, warn};

use cashbook_core::{Account, Clock, LedgerError, LedgerResult, Money, MovementId, UserId};
use cashbook_ledger::{
    AdjustmentDirection, Balances, Movement, MovementDraft, MovementFilter, MovementKind,
    MovementPage, Pagination, PurchaseRef, SaleRef, TransferDirection,
};

use crate::config::ServiceConfig;
use crate::store::{ClosureStore, FundsPolicy, MovementStore};

/// Prefix stamped on every manual adjustment memo.
pub const ADJUSTMENT_MEMO_PREFIX: &str = "MANUAL ADJUSTMENT: ";

/// Ledger operations over a movement store.
///
/// The closure store is only consulted to flag reversals of movements that fall
/// on an already-closed day.
#[derive(Debug)]
pub struct LedgerService<M, C> {
    movements: M,
    closures: C,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl<M, C> LedgerService<M, C>
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

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Commit a raw draft (bulk import, back-dated correction).
    ///
    /// The draft is validated but not funds-checked.
    pub fn append(&self, draft: MovementDraft) -> LedgerResult<MovementId> {
        let movement = draft.into_movement(MovementId::new(), self.clock.now())?;
        self.commit(vec![movement], FundsPolicy::Unchecked)
            .map(|mut ids| ids.remove(0))
    }

    pub fn record_sale_payment(
        &self,
        sale: SaleRef,
        account: Account,
        amount: Money,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let kind = match account {
            Account::Cash => MovementKind::SaleCash,
            Account::Bank => MovementKind::SaleBank,
        };
        let draft = MovementDraft::new(kind, account, amount, true)
            .memo(format!("Sale {sale}"))
            .sale(sale)
            .recorded_by(actor);
        self.record(draft)
    }

    pub fn record_purchase_payment(
        &self,
        purchase: PurchaseRef,
        account: Account,
        amount: Money,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let kind = match account {
            Account::Cash => MovementKind::PurchasePaymentCash,
            Account::Bank => MovementKind::PurchasePaymentBank,
        };
        let draft = MovementDraft::new(kind, account, amount, false)
            .memo(format!("Purchase payment {purchase}"))
            .purchase(purchase)
            .recorded_by(actor);
        self.record(draft)
    }

    pub fn record_withdrawal(
        &self,
        account: Account,
        amount: Money,
        memo: impl Into<String>,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let kind = match account {
            Account::Cash => MovementKind::WithdrawalCash,
            Account::Bank => MovementKind::WithdrawalBank,
        };
        let draft = MovementDraft::new(kind, account, amount, false)
            .memo(memo_or_label(memo.into(), kind))
            .recorded_by(actor);
        self.record(draft)
    }

    pub fn record_expense(
        &self,
        account: Account,
        amount: Money,
        memo: impl Into<String>,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let draft = MovementDraft::new(MovementKind::Expense, account, amount, false)
            .memo(memo_or_label(memo.into(), MovementKind::Expense))
            .recorded_by(actor);
        self.record(draft)
    }

    /// Move funds between the accounts as a debit/credit pair committed together.
    ///
    /// Returns `(debit leg, credit leg)`.
    pub fn transfer(
        &self,
        direction: TransferDirection,
        amount: Money,
        memo: impl Into<String>,
        actor: Option<UserId>,
    ) -> LedgerResult<(MovementId, MovementId)> {
        let memo = memo.into();
        let memo = if memo.trim().is_empty() {
            direction.default_memo(amount)
        } else {
            memo
        };

        let now = self.clock.now();
        let kind = direction.kind();
        let debit = MovementDraft::new(kind, direction.source(), amount, false)
            .memo(memo.clone())
            .recorded_by(actor)
            .into_movement(MovementId::new(), now)?;
        let credit = MovementDraft::new(kind, direction.destination(), amount, true)
            .memo(memo)
            .recorded_by(actor)
            .into_movement(MovementId::new(), now)?;

        let ids = (debit.id, credit.id);
        self.commit(vec![debit, credit], FundsPolicy::RequireFunds)?;
        Ok(ids)
    }

    /// Manual correction of one balance. `reason` is mandatory.
    pub fn adjust(
        &self,
        account: Account,
        direction: AdjustmentDirection,
        amount: Money,
        reason: &str,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::validation("adjustment reason is required"));
        }
        let kind = match account {
            Account::Cash => MovementKind::ManualAdjustmentCash,
            Account::Bank => MovementKind::ManualAdjustmentBank,
        };
        let draft = MovementDraft::new(kind, account, amount, direction.is_credit())
            .memo(format!("{ADJUSTMENT_MEMO_PREFIX}{reason}"))
            .recorded_by(actor);
        self.record(draft)
    }

    /// Seed an account with its starting balance.
    pub fn record_opening_balance(
        &self,
        account: Account,
        amount: Money,
        actor: Option<UserId>,
    ) -> LedgerResult<MovementId> {
        let kind = match account {
            Account::Cash => MovementKind::OpeningBalanceCash,
            Account::Bank => MovementKind::OpeningBalanceBank,
        };
        let draft = MovementDraft::new(kind, account, amount, true)
            .memo(kind.label())
            .recorded_by(actor);
        self.record(draft)
    }

    /// Delete a movement and undo its balance effect.
    ///
    /// Closures are frozen: reversing a movement dated on a closed day does not
    /// touch that closure.
    pub fn reverse(&self, id: MovementId) -> LedgerResult<Movement> {
        let removed = self.movements.reverse(id)?;
        let date = removed.business_date(self.config.business_offset);

        info!(
            movement_id = %removed.id,
            kind = %removed.kind,
            account = %removed.account,
            amount = %removed.amount,
            "movement reversed"
        );
        match self.closures.get(date) {
            Ok(Some(_)) => warn!(
                movement_id = %removed.id,
                %date,
                "reversed a movement on an already-closed day; closure left unchanged"
            ),
            Ok(None) => {}
            // The reversal is committed; only the closed-day check failed.
            Err(err) => error!(
                movement_id = %removed.id,
                %date,
                error = %err,
                "closure lookup failed after reversal"
            ),
        }
        Ok(removed)
    }

    pub fn current_balances(&self) -> LedgerResult<Balances> {
        self.movements.current_balances()
    }

    /// Rebuild the cached balances from the full log.
    pub fn recompute_balances(&self) -> LedgerResult<Balances> {
        let result = self.movements.reconcile(true)?;
        for account in result.cached.differences(&result.recomputed) {
            warn!(
                %account,
                cached = %result.cached.get(account),
                recomputed = %result.recomputed.get(account),
                "balance cache drift repaired"
            );
        }
        info!(
            cash = %result.recomputed.cash,
            bank = %result.recomputed.bank,
            "balances recomputed"
        );
        Ok(result.recomputed)
    }

    /// Compare the cache against the log without writing.
    ///
    /// Fails with `Consistency` naming the first drifted account.
    pub fn verify_balances(&self) -> LedgerResult<Balances> {
        let result = self.movements.reconcile(false)?;
        if let Some(account) = result.cached.differences(&result.recomputed).first().copied() {
            let err = LedgerError::Consistency {
                account,
                cached: result.cached.get(account),
                recomputed: result.recomputed.get(account),
            };
            error!(error = %err, "balance cache disagrees with movement log");
            return Err(err);
        }
        Ok(result.cached)
    }

    /// Movement history, newest first.
    pub fn list_movements(
        &self,
        filter: &MovementFilter,
        pagination: Pagination,
    ) -> LedgerResult<MovementPage> {
        filter.validate()?;
        let mut matching = self
            .movements
            .movements(filter, self.config.business_offset)?;
        matching.reverse();

        let total = matching.len() as u64;
        let movements = pagination.apply(matching);
        let has_more = u64::from(pagination.offset) + (movements.len() as u64) < total;

        Ok(MovementPage {
            movements,
            total,
            pagination,
            has_more,
        })
    }

    pub fn get_movement(&self, id: MovementId) -> LedgerResult<Movement> {
        self.movements
            .get(id)?
            .ok_or_else(|| LedgerError::not_found(format!("movement {id}")))
    }

    /// Single funds-checked movement. Credits never fail the check.
    fn record(&self, draft: MovementDraft) -> LedgerResult<MovementId> {
        let movement = draft.into_movement(MovementId::new(), self.clock.now())?;
        self.commit(vec![movement], FundsPolicy::RequireFunds)
            .map(|mut ids| ids.remove(0))
    }

    fn commit(&self, batch: Vec<Movement>, policy: FundsPolicy) -> LedgerResult<Vec<MovementId>> {
        let ids: Vec<MovementId> = batch.iter().map(|m| m.id).collect();
        let summary: Vec<(MovementKind, Account, Money, Option<UserId>)> = batch
            .iter()
            .map(|m| (m.kind, m.account, m.signed_amount(), m.recorded_by))
            .collect();

        match self.movements.append(batch, policy) {
            Ok(()) => {
                for ((kind, account, amount, actor), id) in summary.into_iter().zip(&ids) {
                    info!(
                        movement_id = %id,
                        %kind,
                        %account,
                        %amount,
                        actor = ?actor,
                        "movement recorded"
                    );
                }
                Ok(ids)
            }
            Err(err @ LedgerError::InsufficientFunds { .. }) => {
                warn!(error = %err, "debit rejected");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

fn memo_or_label(memo: String, kind: MovementKind) -> String {
    if memo.trim().is_empty() {
        kind.label().to_string()
    } else {
        memo
    }
}
