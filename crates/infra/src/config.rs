//! Service configuration.

use chrono::{FixedOffset, Offset, Utc};

use cashbook_core::{LedgerError, LedgerResult};

/// Largest UTC offset accepted, in minutes (just under a day).
pub const MAX_OFFSET_MINUTES: i32 = 23 * 60 + 59;

/// Settings shared by the ledger and closure services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Time zone of the business day: decides which calendar date a movement
    /// timestamp belongs to.
    pub business_offset: FixedOffset,
}

impl ServiceConfig {
    pub fn new(business_offset: FixedOffset) -> Self {
        Self { business_offset }
    }

    /// Build from an offset east of UTC in minutes (negative = west).
    pub fn from_offset_minutes(minutes: i32) -> LedgerResult<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(LedgerError::validation(format!(
                "utc offset {minutes} minutes is out of range (max ±{MAX_OFFSET_MINUTES})"
            )));
        }
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            LedgerError::validation(format!("utc offset {minutes} minutes is invalid"))
        })?;
        Ok(Self::new(offset))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            business_offset: Utc.fix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_minutes_are_bounded() {
        let cfg = ServiceConfig::from_offset_minutes(-180).unwrap();
        assert_eq!(cfg.business_offset.local_minus_utc(), -180 * 60);
        assert!(ServiceConfig::from_offset_minutes(24 * 60).is_err());
    }

    #[test]
    fn default_is_utc() {
        assert_eq!(ServiceConfig::default().business_offset.local_minus_utc(), 0);
    }
}
