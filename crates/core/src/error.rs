//! Ledger error model.

use chrono::NaiveDate;
use thiserror::Error;

use crate::account::Account;
use crate::money::Money;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant except `Consistency` and `Storage` is raised before any state
/// change, so the caller can correct the request and retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed input (non-positive amount, missing reason, bad account flags).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A debit would drive the account balance negative.
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: Account,
        requested: Money,
        available: Money,
    },

    /// The referenced movement or closure does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A closure already exists for the date.
    #[error("cash closure already exists for {0}")]
    AlreadyClosed(NaiveDate),

    /// The cached balance disagrees with a full recomputation of the movement log.
    #[error("{account} balance drifted: cached {cached}, recomputed {recomputed}")]
    Consistency {
        account: Account,
        cached: Money,
        recomputed: Money,
    },

    /// The storage layer failed (e.g. poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Short machine-readable code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "validation_error",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::AlreadyClosed(_) => "already_closed",
            LedgerError::Consistency { .. } => "consistency_error",
            LedgerError::Storage(_) => "storage_error",
        }
    }
}
