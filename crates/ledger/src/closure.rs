//! Daily cash closure: per-category totals, expected balances and the variance
//! against a physical cash count.
//!
//! Everything here is pure arithmetic. Persisting a closure (and enforcing one per
//! date) is the storage layer's job.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cashbook_core::{Account, LedgerError, LedgerResult, Money, UserId};

use crate::balances::Balances;
use crate::movement::{Movement, MovementKind};

/// Per-category totals of one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sales_cash: Money,
    pub sales_bank: Money,
    pub purchases_cash: Money,
    pub purchases_bank: Money,
    pub withdrawals_cash: Money,
    pub withdrawals_bank: Money,
    pub expenses_cash: Money,
    pub expenses_bank: Money,
    /// Cash → bank deposits (each transfer counted once).
    pub transfers_out: Money,
    /// Bank → cash withdrawals (each transfer counted once).
    pub transfers_in: Money,
    /// Signed net of manual adjustments and opening balances on cash.
    /// Reported only; not part of the expected balance.
    pub adjustments_cash: Money,
    /// Signed net of manual adjustments and opening balances on bank.
    pub adjustments_bank: Money,
    pub movement_count: usize,
}

impl DailyTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sales_cash: Money::ZERO,
            sales_bank: Money::ZERO,
            purchases_cash: Money::ZERO,
            purchases_bank: Money::ZERO,
            withdrawals_cash: Money::ZERO,
            withdrawals_bank: Money::ZERO,
            expenses_cash: Money::ZERO,
            expenses_bank: Money::ZERO,
            transfers_out: Money::ZERO,
            transfers_in: Money::ZERO,
            adjustments_cash: Money::ZERO,
            adjustments_bank: Money::ZERO,
            movement_count: 0,
        }
    }

    /// Aggregate the movements whose timestamp falls on `date` in the business
    /// time zone `offset`. Movements from other dates are ignored.
    pub fn aggregate<'a>(
        date: NaiveDate,
        offset: FixedOffset,
        movements: impl IntoIterator<Item = &'a Movement>,
    ) -> Self {
        let mut totals = Self::empty(date);

        for m in movements {
            if m.business_date(offset) != date {
                continue;
            }
            totals.movement_count += 1;

            match m.kind {
                MovementKind::SaleCash => totals.sales_cash += m.amount,
                MovementKind::SaleBank => totals.sales_bank += m.amount,
                MovementKind::PurchasePaymentCash => totals.purchases_cash += m.amount,
                MovementKind::PurchasePaymentBank => totals.purchases_bank += m.amount,
                MovementKind::WithdrawalCash => totals.withdrawals_cash += m.amount,
                MovementKind::WithdrawalBank => totals.withdrawals_bank += m.amount,
                MovementKind::Expense => match m.account {
                    Account::Cash => totals.expenses_cash += m.amount,
                    Account::Bank => totals.expenses_bank += m.amount,
                },
                // Both legs carry the transfer kind; only the cash-side leg counts.
                MovementKind::TransferCashToBank => {
                    if m.affects_cash() {
                        totals.transfers_out += m.amount;
                    }
                }
                MovementKind::TransferBankToCash => {
                    if m.affects_cash() {
                        totals.transfers_in += m.amount;
                    }
                }
                MovementKind::ManualAdjustmentCash
                | MovementKind::ManualAdjustmentBank
                | MovementKind::OpeningBalanceCash
                | MovementKind::OpeningBalanceBank => match m.account {
                    Account::Cash => totals.adjustments_cash += m.signed_amount(),
                    Account::Bank => totals.adjustments_bank += m.signed_amount(),
                },
            }
        }

        totals
    }

    /// Day's effect on cash per the closure formula.
    pub fn net_cash(&self) -> Money {
        self.sales_cash + self.transfers_in
            - self.purchases_cash
            - self.withdrawals_cash
            - self.expenses_cash
            - self.transfers_out
    }

    /// Day's effect on bank per the closure formula.
    pub fn net_bank(&self) -> Money {
        self.sales_bank + self.transfers_out
            - self.purchases_bank
            - self.withdrawals_bank
            - self.expenses_bank
            - self.transfers_in
    }

    /// Expected closing balances given the day's opening balances.
    pub fn expected(&self, opening: Balances) -> Balances {
        Balances::new(opening.cash + self.net_cash(), opening.bank + self.net_bank())
    }
}

/// Result of comparing the counted cash with the expected figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum ClosureOutcome {
    Balanced,
    /// More cash counted than expected.
    Surplus(Money),
    /// Less cash counted than expected.
    Shortage(Money),
}

/// Immutable daily reconciliation record. One per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    pub date: NaiveDate,
    pub opening_cash: Money,
    pub opening_bank: Money,
    pub totals: DailyTotals,
    pub expected_cash: Money,
    pub expected_bank: Money,
    pub counted_cash: Money,
    /// `counted_cash - expected_cash`.
    pub cash_variance: Money,
    pub notes: String,
    pub closed_by: Option<UserId>,
    pub closed_at: DateTime<Utc>,
}

/// Inputs of a closure supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseDay {
    pub date: NaiveDate,
    pub counted_cash: Money,
    pub notes: String,
    pub closed_by: Option<UserId>,
    pub closed_at: DateTime<Utc>,
}

impl Closure {
    /// Compute a closure from the prior closure's expected balances (or zero) and
    /// the day's totals.
    ///
    /// Deterministic: the same inputs always give the same expected balances and
    /// variance.
    pub fn compute(cmd: CloseDay, opening: Balances, totals: DailyTotals) -> LedgerResult<Self> {
        if totals.date != cmd.date {
            return Err(LedgerError::validation(format!(
                "totals are for {} but closing {}",
                totals.date, cmd.date
            )));
        }
        if cmd.counted_cash.is_negative() {
            return Err(LedgerError::validation(format!(
                "counted cash cannot be negative (got {})",
                cmd.counted_cash
            )));
        }

        let expected = totals.expected(opening);

        Ok(Self {
            date: cmd.date,
            opening_cash: opening.cash,
            opening_bank: opening.bank,
            totals,
            expected_cash: expected.cash,
            expected_bank: expected.bank,
            counted_cash: cmd.counted_cash,
            cash_variance: cmd.counted_cash - expected.cash,
            notes: cmd.notes,
            closed_by: cmd.closed_by,
            closed_at: cmd.closed_at,
        })
    }

    pub fn expected(&self) -> Balances {
        Balances::new(self.expected_cash, self.expected_bank)
    }

    pub fn outcome(&self) -> ClosureOutcome {
        if self.cash_variance.is_zero() {
            ClosureOutcome::Balanced
        } else if self.cash_variance.is_positive() {
            ClosureOutcome::Surplus(self.cash_variance)
        } else {
            ClosureOutcome::Shortage(self.cash_variance.abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementDraft;
    use cashbook_core::MovementId;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap()
    }

    fn mv(kind: MovementKind, account: Account, cents: i64, credit: bool, hour: u32) -> Movement {
        MovementDraft::new(kind, account, Money::from_cents(cents), credit)
            .at(at(hour))
            .into_movement(MovementId::new(), at(hour))
            .unwrap()
    }

    fn close(counted_cents: i64) -> CloseDay {
        CloseDay {
            date: day(),
            counted_cash: Money::from_cents(counted_cents),
            notes: String::new(),
            closed_by: None,
            closed_at: at(20),
        }
    }

    /// Sale 100 cash, deposit 60 to bank (two legs), rent 10 from bank.
    fn example_day() -> Vec<Movement> {
        vec![
            mv(MovementKind::SaleCash, Account::Cash, 10_000, true, 9),
            mv(MovementKind::TransferCashToBank, Account::Cash, 6_000, false, 10),
            mv(MovementKind::TransferCashToBank, Account::Bank, 6_000, true, 10),
            mv(MovementKind::Expense, Account::Bank, 1_000, false, 11),
        ]
    }

    #[test]
    fn example_day_closes_balanced() {
        let movements = example_day();
        let totals = DailyTotals::aggregate(day(), utc(), &movements);

        assert_eq!(totals.sales_cash, Money::from_cents(10_000));
        assert_eq!(totals.transfers_out, Money::from_cents(6_000));
        assert_eq!(totals.expenses_bank, Money::from_cents(1_000));
        assert_eq!(totals.movement_count, 4);

        let closure = Closure::compute(close(4_000), Balances::default(), totals).unwrap();
        assert_eq!(closure.expected_cash, Money::from_cents(4_000));
        assert_eq!(closure.expected_bank, Money::from_cents(5_000));
        assert_eq!(closure.cash_variance, Money::ZERO);
        assert_eq!(closure.outcome(), ClosureOutcome::Balanced);
    }

    #[test]
    fn opening_balances_carry_into_expected() {
        let totals = DailyTotals::aggregate(day(), utc(), &example_day());
        let opening = Balances::new(Money::from_cents(2_500), Money::from_cents(100_000));
        let closure = Closure::compute(close(6_000), opening, totals).unwrap();

        assert_eq!(closure.opening_cash, Money::from_cents(2_500));
        assert_eq!(closure.expected_cash, Money::from_cents(6_500));
        assert_eq!(closure.expected_bank, Money::from_cents(105_000));
        assert_eq!(closure.outcome(), ClosureOutcome::Shortage(Money::from_cents(500)));
    }

    #[test]
    fn bank_to_cash_transfer_moves_expected_balances() {
        let movements = vec![
            mv(MovementKind::TransferBankToCash, Account::Bank, 3_000, false, 9),
            mv(MovementKind::TransferBankToCash, Account::Cash, 3_000, true, 9),
        ];
        let totals = DailyTotals::aggregate(day(), utc(), &movements);
        assert_eq!(totals.transfers_in, Money::from_cents(3_000));
        assert_eq!(totals.net_cash(), Money::from_cents(3_000));
        assert_eq!(totals.net_bank(), Money::from_cents(-3_000));
    }

    #[test]
    fn other_days_and_adjustments_do_not_enter_formula() {
        let mut movements = example_day();
        let yesterday = Utc.with_ymd_and_hms(2026, 5, 3, 12, 0, 0).unwrap();
        movements.push(
            MovementDraft::new(MovementKind::SaleCash, Account::Cash, Money::from_cents(99_900), true)
                .at(yesterday)
                .into_movement(MovementId::new(), yesterday)
                .unwrap(),
        );
        movements.push(mv(MovementKind::ManualAdjustmentCash, Account::Cash, 700, true, 12));
        movements.push(mv(MovementKind::OpeningBalanceBank, Account::Bank, 300, true, 8));

        let totals = DailyTotals::aggregate(day(), utc(), &movements);
        assert_eq!(totals.movement_count, 6);
        assert_eq!(totals.adjustments_cash, Money::from_cents(700));
        assert_eq!(totals.adjustments_bank, Money::from_cents(300));
        assert_eq!(totals.net_cash(), Money::from_cents(4_000));
        assert_eq!(totals.net_bank(), Money::from_cents(5_000));
    }

    #[test]
    fn negative_count_is_rejected() {
        let totals = DailyTotals::empty(day());
        let err = Closure::compute(close(-1), Balances::default(), totals).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn surplus_outcome_reports_amount() {
        let totals = DailyTotals::aggregate(day(), utc(), &example_day());
        let closure = Closure::compute(close(4_250), Balances::default(), totals).unwrap();
        assert_eq!(closure.outcome(), ClosureOutcome::Surplus(Money::from_cents(250)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: a closure is a pure function of (opening, movements, count).
        #[test]
        fn closure_is_deterministic(
            sales in prop::collection::vec(1i64..100_000i64, 0..10),
            expenses in prop::collection::vec(1i64..10_000i64, 0..10),
            opening_cash in 0i64..1_000_000i64,
            counted in 0i64..1_000_000i64,
        ) {
            let mut movements = Vec::new();
            for (i, cents) in sales.iter().enumerate() {
                movements.push(mv(MovementKind::SaleCash, Account::Cash, *cents, true, (i % 12) as u32));
            }
            for (i, cents) in expenses.iter().enumerate() {
                movements.push(mv(MovementKind::Expense, Account::Cash, *cents, false, (i % 12) as u32 + 12));
            }
            let opening = Balances::new(Money::from_cents(opening_cash), Money::ZERO);

            let first = Closure::compute(
                close(counted),
                opening,
                DailyTotals::aggregate(day(), utc(), &movements),
            ).unwrap();
            movements.reverse();
            let second = Closure::compute(
                close(counted),
                opening,
                DailyTotals::aggregate(day(), utc(), &movements),
            ).unwrap();

            prop_assert_eq!(first.expected_cash, second.expected_cash);
            prop_assert_eq!(first.expected_bank, second.expected_bank);
            prop_assert_eq!(first.cash_variance, second.cash_variance);

            let sales_total: i64 = sales.iter().sum();
            let expense_total: i64 = expenses.iter().sum();
            prop_assert_eq!(
                first.expected_cash,
                Money::from_cents(opening_cash + sales_total - expense_total)
            );
        }
    }
}
