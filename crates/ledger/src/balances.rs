use serde::{Deserialize, Serialize};

use cashbook_core::{Account, Money};

use crate::movement::Movement;

/// The pair of running balances derived from the movement log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub cash: Money,
    pub bank: Money,
}

impl Balances {
    pub fn new(cash: Money, bank: Money) -> Self {
        Self { cash, bank }
    }

    pub fn get(&self, account: Account) -> Money {
        match account {
            Account::Cash => self.cash,
            Account::Bank => self.bank,
        }
    }

    pub fn get_mut(&mut self, account: Account) -> &mut Money {
        match account {
            Account::Cash => &mut self.cash,
            Account::Bank => &mut self.bank,
        }
    }

    /// Total available across both accounts.
    pub fn total(&self) -> Money {
        self.cash + self.bank
    }

    /// Apply a movement's signed amount to the account it affects.
    pub fn apply(&mut self, movement: &Movement) {
        *self.get_mut(movement.account) += movement.signed_amount();
    }

    /// Undo [`Balances::apply`].
    pub fn revert(&mut self, movement: &Movement) {
        *self.get_mut(movement.account) -= movement.signed_amount();
    }

    /// Sum signed amounts per account over a full log (the source of truth).
    pub fn from_movements<'a>(movements: impl IntoIterator<Item = &'a Movement>) -> Self {
        let mut balances = Balances::default();
        for m in movements {
            balances.apply(m);
        }
        balances
    }

    /// Accounts whose value differs from `other`.
    pub fn differences(&self, other: &Balances) -> Vec<Account> {
        Account::ALL
            .into_iter()
            .filter(|a| self.get(*a) != other.get(*a))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{MovementDraft, MovementKind};
    use cashbook_core::MovementId;
    use chrono::Utc;
    use proptest::prelude::*;

    fn movement(kind: MovementKind, account: Account, cents: i64, credit: bool) -> Movement {
        MovementDraft::new(kind, account, Money::from_cents(cents), credit)
            .into_movement(MovementId::new(), Utc::now())
            .unwrap()
    }

    #[test]
    fn apply_and_revert_are_inverse() {
        let sale = movement(MovementKind::SaleCash, Account::Cash, 10_000, true);
        let mut b = Balances::default();
        b.apply(&sale);
        assert_eq!(b.cash, Money::from_cents(10_000));
        assert_eq!(b.bank, Money::ZERO);
        b.revert(&sale);
        assert_eq!(b, Balances::default());
    }

    #[test]
    fn total_sums_both_accounts() {
        let b = Balances::new(Money::from_cents(4_000), Money::from_cents(5_000));
        assert_eq!(b.total(), Money::from_cents(9_000));
    }

    #[test]
    fn differences_lists_drifted_accounts() {
        let a = Balances::new(Money::from_cents(1), Money::from_cents(2));
        let b = Balances::new(Money::from_cents(1), Money::from_cents(3));
        assert_eq!(a.differences(&b), vec![Account::Bank]);
        assert!(a.differences(&a).is_empty());
    }

    fn arb_adjustment() -> impl Strategy<Value = Movement> {
        (any::<bool>(), any::<bool>(), 1i64..1_000_000i64).prop_map(|(cash, credit, cents)| {
            if cash {
                movement(MovementKind::ManualAdjustmentCash, Account::Cash, cents, credit)
            } else {
                movement(MovementKind::ManualAdjustmentBank, Account::Bank, cents, credit)
            }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: folding movements one at a time equals summing signed amounts
        /// per account.
        #[test]
        fn incremental_fold_matches_per_account_sum(
            movements in prop::collection::vec(arb_adjustment(), 0..40)
        ) {
            let mut incremental = Balances::default();
            for m in &movements {
                incremental.apply(m);
            }

            let cash: Money = movements.iter().filter(|m| m.affects_cash()).map(|m| m.signed_amount()).sum();
            let bank: Money = movements.iter().filter(|m| m.affects_bank()).map(|m| m.signed_amount()).sum();

            prop_assert_eq!(incremental, Balances::new(cash, bank));
            prop_assert_eq!(incremental, Balances::from_movements(&movements));
        }
    }
}
