//! Movement history filters and pagination.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use cashbook_core::{Account, LedgerError, LedgerResult};

use crate::movement::{Movement, MovementKind};

/// Pagination parameters for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// Slice one page out of `items` (already in display order).
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter criteria for movement history; all criteria are optional and combined
/// with AND. Date bounds are inclusive business dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub kind: Option<MovementKind>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account: Option<Account>,
}

impl MovementFilter {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(LedgerError::validation(format!(
                    "date range is inverted ({from} after {to})"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, movement: &Movement, offset: FixedOffset) -> bool {
        if let Some(kind) = self.kind {
            if movement.kind != kind {
                return false;
            }
        }
        if let Some(account) = self.account {
            if movement.account != account {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let date = movement.business_date(offset);
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        true
    }
}

/// One page of movement history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPage {
    pub movements: Vec<Movement>,
    /// Number of movements matching the filter across all pages.
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}
