//! Fixed-point currency amounts.
//!
//! Every amount the ledger stores or computes is a `Money`: a decimal with
//! exactly two fractional digits. Floating point never touches a balance.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Signed currency amount with two fractional digits.
///
/// Balances may be negative (e.g. after reversing a credit); movement amounts are
/// checked separately with [`Money::ensure_positive`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Number of fractional digits carried by every amount.
    pub const SCALE: u32 = 2;

    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Build an amount, rejecting more than two fractional digits or values past
    /// [`Money::limit`].
    pub fn new(value: Decimal) -> LedgerResult<Self> {
        if value.normalize().scale() > Self::SCALE {
            return Err(LedgerError::validation(format!(
                "amount {value} has more than {} fractional digits",
                Self::SCALE
            )));
        }
        if value.abs() > Self::limit().0 {
            return Err(LedgerError::validation(format!(
                "amount {value} exceeds the maximum of {}",
                Self::limit()
            )));
        }
        let mut scaled = value;
        scaled.rescale(Self::SCALE);
        Ok(Self(scaled))
    }

    /// Largest magnitude accepted from callers (12 significant digits).
    pub fn limit() -> Money {
        Money::from_cents(999_999_999_999)
    }

    /// Amount from a count of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Money {
        Money(self.0.abs())
    }

    /// Reject zero and negative amounts; `what` names the field in the error.
    pub fn ensure_positive(self, what: &str) -> LedgerResult<Self> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(LedgerError::validation(format!(
                "{what} must be positive (got {self})"
            )))
        }
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| LedgerError::validation(format!("invalid amount '{s}': {e}")))?;
        Money::new(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> core::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rescales_to_two_digits() {
        let m = Money::new(dec!(100)).unwrap();
        assert_eq!(m.to_string(), "100.00");
        assert_eq!(m, Money::from_cents(10_000));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let err = Money::new(dec!(1.005)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        // Trailing zeros are not extra precision.
        assert!(Money::new(dec!(1.500)).is_ok());
    }

    #[test]
    fn rejects_values_past_limit() {
        assert_eq!(Money::limit().to_string(), "9999999999.99");
        assert!(Money::new(dec!(9999999999.99)).is_ok());
        assert!(Money::new(dec!(10000000000.00)).is_err());
        assert!(Money::new(dec!(-10000000000.00)).is_err());
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(Money::ZERO.ensure_positive("amount").is_err());
        assert!(Money::from_cents(-1).ensure_positive("amount").is_err());
        assert!(Money::from_cents(1).ensure_positive("amount").is_ok());
    }

    #[test]
    fn arithmetic_keeps_two_digits() {
        let a: Money = "100.00".parse().unwrap();
        let b: Money = "60".parse().unwrap();
        assert_eq!((a - b).to_string(), "40.00");
        assert_eq!((b - a).to_string(), "-40.00");
        let total: Money = [a, b].iter().sum();
        assert_eq!(total.to_string(), "160.00");
    }

    #[test]
    fn serde_goes_through_validation() {
        let m: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(m, Money::from_cents(1_250));
        assert!(serde_json::from_str::<Money>("\"0.001\"").is_err());
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"12.50\"");
    }
}
