//! The two tracked balances.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One of the two balances a deployment tracks.
///
/// Ordering is significant: when both accounts must be locked together they are
/// always acquired in `Cash`, `Bank` order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    /// Cash on hand (the physical till).
    Cash,
    /// Bank account.
    Bank,
}

impl Account {
    pub const ALL: [Account; 2] = [Account::Cash, Account::Bank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Cash => "cash",
            Account::Bank => "bank",
        }
    }

    /// The other account (transfer counterpart).
    pub fn other(&self) -> Account {
        match self {
            Account::Cash => Account::Bank,
            Account::Bank => Account::Cash,
        }
    }
}

impl core::fmt::Display for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Account {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(Account::Cash),
            "bank" => Ok(Account::Bank),
            other => Err(LedgerError::validation(format!(
                "unknown account '{other}' (expected cash or bank)"
            ))),
        }
    }
}
