use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cashbook_core::{Account, LedgerError, LedgerResult, Money, MovementId, UserId};

/// Closed set of movement categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    SaleCash,
    SaleBank,
    PurchasePaymentCash,
    PurchasePaymentBank,
    TransferCashToBank,
    TransferBankToCash,
    WithdrawalCash,
    WithdrawalBank,
    Expense,
    ManualAdjustmentCash,
    ManualAdjustmentBank,
    OpeningBalanceCash,
    OpeningBalanceBank,
}

impl MovementKind {
    pub const ALL: [MovementKind; 13] = [
        MovementKind::SaleCash,
        MovementKind::SaleBank,
        MovementKind::PurchasePaymentCash,
        MovementKind::PurchasePaymentBank,
        MovementKind::TransferCashToBank,
        MovementKind::TransferBankToCash,
        MovementKind::WithdrawalCash,
        MovementKind::WithdrawalBank,
        MovementKind::Expense,
        MovementKind::ManualAdjustmentCash,
        MovementKind::ManualAdjustmentBank,
        MovementKind::OpeningBalanceCash,
        MovementKind::OpeningBalanceBank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::SaleCash => "sale-cash",
            MovementKind::SaleBank => "sale-bank",
            MovementKind::PurchasePaymentCash => "purchase-payment-cash",
            MovementKind::PurchasePaymentBank => "purchase-payment-bank",
            MovementKind::TransferCashToBank => "transfer-cash-to-bank",
            MovementKind::TransferBankToCash => "transfer-bank-to-cash",
            MovementKind::WithdrawalCash => "withdrawal-cash",
            MovementKind::WithdrawalBank => "withdrawal-bank",
            MovementKind::Expense => "expense",
            MovementKind::ManualAdjustmentCash => "manual-adjustment-cash",
            MovementKind::ManualAdjustmentBank => "manual-adjustment-bank",
            MovementKind::OpeningBalanceCash => "opening-balance-cash",
            MovementKind::OpeningBalanceBank => "opening-balance-bank",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::SaleCash => "Cash sale",
            MovementKind::SaleBank => "Bank/transfer sale",
            MovementKind::PurchasePaymentCash => "Purchase paid in cash",
            MovementKind::PurchasePaymentBank => "Purchase paid by bank",
            MovementKind::TransferCashToBank => "Deposit (cash to bank)",
            MovementKind::TransferBankToCash => "Bank withdrawal (bank to cash)",
            MovementKind::WithdrawalCash => "Cash withdrawal",
            MovementKind::WithdrawalBank => "Bank withdrawal",
            MovementKind::Expense => "Expense",
            MovementKind::ManualAdjustmentCash => "Manual cash adjustment",
            MovementKind::ManualAdjustmentBank => "Manual bank adjustment",
            MovementKind::OpeningBalanceCash => "Opening cash balance",
            MovementKind::OpeningBalanceBank => "Opening bank balance",
        }
    }

    /// Account this kind is bound to; `None` for kinds valid on either account
    /// (expenses and the two legs of a transfer).
    pub fn fixed_account(&self) -> Option<Account> {
        match self {
            MovementKind::SaleCash
            | MovementKind::PurchasePaymentCash
            | MovementKind::WithdrawalCash
            | MovementKind::ManualAdjustmentCash
            | MovementKind::OpeningBalanceCash => Some(Account::Cash),
            MovementKind::SaleBank
            | MovementKind::PurchasePaymentBank
            | MovementKind::WithdrawalBank
            | MovementKind::ManualAdjustmentBank
            | MovementKind::OpeningBalanceBank => Some(Account::Bank),
            MovementKind::TransferCashToBank
            | MovementKind::TransferBankToCash
            | MovementKind::Expense => None,
        }
    }

    /// Required polarity (`true` = credit) of a movement of this kind on `account`.
    ///
    /// `None` means either polarity is allowed (manual adjustments).
    pub fn required_credit(&self, account: Account) -> Option<bool> {
        match self {
            MovementKind::SaleCash
            | MovementKind::SaleBank
            | MovementKind::OpeningBalanceCash
            | MovementKind::OpeningBalanceBank => Some(true),
            MovementKind::PurchasePaymentCash
            | MovementKind::PurchasePaymentBank
            | MovementKind::WithdrawalCash
            | MovementKind::WithdrawalBank
            | MovementKind::Expense => Some(false),
            MovementKind::TransferCashToBank => Some(account == Account::Bank),
            MovementKind::TransferBankToCash => Some(account == Account::Cash),
            MovementKind::ManualAdjustmentCash | MovementKind::ManualAdjustmentBank => None,
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            MovementKind::TransferCashToBank | MovementKind::TransferBankToCash
        )
    }

    fn check(&self, account: Account, is_credit: bool) -> LedgerResult<()> {
        if let Some(fixed) = self.fixed_account() {
            if fixed != account {
                return Err(LedgerError::validation(format!(
                    "movement kind {self} cannot affect the {account} account"
                )));
            }
        }
        if let Some(credit) = self.required_credit(account) {
            if credit != is_credit {
                let expected = if credit { "credit" } else { "debit" };
                return Err(LedgerError::validation(format!(
                    "movement kind {self} on {account} must be a {expected}"
                )));
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MovementKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| LedgerError::validation(format!("unknown movement kind '{wanted}'")))
    }
}

/// Direction of a transfer between the two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    CashToBank,
    BankToCash,
}

impl TransferDirection {
    pub fn source(&self) -> Account {
        match self {
            TransferDirection::CashToBank => Account::Cash,
            TransferDirection::BankToCash => Account::Bank,
        }
    }

    pub fn destination(&self) -> Account {
        self.source().other()
    }

    pub fn kind(&self) -> MovementKind {
        match self {
            TransferDirection::CashToBank => MovementKind::TransferCashToBank,
            TransferDirection::BankToCash => MovementKind::TransferBankToCash,
        }
    }

    /// Memo used when the caller leaves it empty.
    pub fn default_memo(&self, amount: Money) -> String {
        match self {
            TransferDirection::CashToBank => format!("Deposit to bank of {amount}"),
            TransferDirection::BankToCash => format!("Bank withdrawal to cash of {amount}"),
        }
    }
}

/// Direction of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

impl AdjustmentDirection {
    pub fn is_credit(&self) -> bool {
        matches!(self, AdjustmentDirection::Increase)
    }
}

/// Back-reference to a sale in the point-of-sale subsystem (display only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleRef(pub String);

/// Back-reference to a purchase (display only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseRef(pub String);

impl core::fmt::Display for SaleRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::fmt::Display for PurchaseRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A committed, immutable movement.
///
/// Movements are never edited. The only undo is reversal, which deletes the
/// record and applies the inverse balance delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub kind: MovementKind,
    /// Always positive; the sign lives in `is_credit`.
    pub amount: Money,
    pub memo: String,
    /// When the movement happened (may be back-dated by the caller).
    pub timestamp: DateTime<Utc>,
    pub account: Account,
    /// true = increases the affected balance, false = decreases it.
    pub is_credit: bool,
    pub linked_sale: Option<SaleRef>,
    pub linked_purchase: Option<PurchaseRef>,
    pub recorded_by: Option<UserId>,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

impl Movement {
    pub fn affects_cash(&self) -> bool {
        self.account == Account::Cash
    }

    pub fn affects_bank(&self) -> bool {
        self.account == Account::Bank
    }

    /// `+amount` for credits, `-amount` for debits.
    pub fn signed_amount(&self) -> Money {
        if self.is_credit { self.amount } else { -self.amount }
    }

    /// Calendar date of `timestamp` in the business time zone.
    pub fn business_date(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(&offset).date_naive()
    }
}

/// Uncommitted movement in its storage shape (explicit per-account flags).
///
/// This is what bulk imports and back-dated corrections submit; it is validated
/// before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub kind: MovementKind,
    pub amount: Money,
    #[serde(default)]
    pub memo: String,
    /// Defaults to the time of the append.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub affects_cash: bool,
    pub affects_bank: bool,
    pub is_credit: bool,
    #[serde(default)]
    pub linked_sale: Option<SaleRef>,
    #[serde(default)]
    pub linked_purchase: Option<PurchaseRef>,
    #[serde(default)]
    pub recorded_by: Option<UserId>,
}

impl MovementDraft {
    pub fn new(kind: MovementKind, account: Account, amount: Money, is_credit: bool) -> Self {
        Self {
            kind,
            amount,
            memo: String::new(),
            timestamp: None,
            affects_cash: account == Account::Cash,
            affects_bank: account == Account::Bank,
            is_credit,
            linked_sale: None,
            linked_purchase: None,
            recorded_by: None,
        }
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn sale(mut self, sale: SaleRef) -> Self {
        self.linked_sale = Some(sale);
        self
    }

    pub fn purchase(mut self, purchase: PurchaseRef) -> Self {
        self.linked_purchase = Some(purchase);
        self
    }

    pub fn recorded_by(mut self, actor: Option<UserId>) -> Self {
        self.recorded_by = actor;
        self
    }

    /// The single account this draft affects.
    pub fn account(&self) -> LedgerResult<Account> {
        match (self.affects_cash, self.affects_bank) {
            (true, false) => Ok(Account::Cash),
            (false, true) => Ok(Account::Bank),
            (false, false) => Err(LedgerError::validation(
                "movement must affect either cash or bank",
            )),
            (true, true) => Err(LedgerError::validation(
                "movement cannot affect both cash and bank; record a transfer as two movements",
            )),
        }
    }

    /// Check amount, account flags and kind/polarity agreement.
    pub fn validate(&self) -> LedgerResult<Account> {
        self.amount.ensure_positive("amount")?;
        let account = self.account()?;
        self.kind.check(account, self.is_credit)?;
        Ok(account)
    }

    /// Validate and stamp the draft into a committed movement.
    pub fn into_movement(self, id: MovementId, now: DateTime<Utc>) -> LedgerResult<Movement> {
        let account = self.validate()?;
        Ok(Movement {
            id,
            kind: self.kind,
            amount: self.amount,
            memo: self.memo,
            timestamp: self.timestamp.unwrap_or(now),
            account,
            is_credit: self.is_credit,
            linked_sale: self.linked_sale,
            linked_purchase: self.linked_purchase,
            recorded_by: self.recorded_by,
            recorded_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 15, 30, 0).unwrap()
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in MovementKind::ALL {
            assert_eq!(kind.as_str().parse::<MovementKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn draft_with_no_account_is_rejected() {
        let mut draft = MovementDraft::new(
            MovementKind::Expense,
            Account::Cash,
            Money::from_cents(500),
            false,
        );
        draft.affects_cash = false;
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("either")));
    }

    #[test]
    fn draft_with_both_accounts_is_rejected() {
        let mut draft = MovementDraft::new(
            MovementKind::Expense,
            Account::Cash,
            Money::from_cents(500),
            false,
        );
        draft.affects_bank = true;
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(msg) if msg.contains("both")));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let draft = MovementDraft::new(MovementKind::SaleCash, Account::Cash, Money::ZERO, true);
        assert!(matches!(draft.validate(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn kind_must_match_account() {
        let draft = MovementDraft::new(
            MovementKind::SaleCash,
            Account::Bank,
            Money::from_cents(100),
            true,
        );
        assert!(matches!(draft.validate(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn kind_must_match_polarity() {
        let sale_debit = MovementDraft::new(
            MovementKind::SaleBank,
            Account::Bank,
            Money::from_cents(100),
            false,
        );
        assert!(sale_debit.validate().is_err());

        // Transfer legs: cash→bank debits cash and credits bank.
        let cash_leg = MovementDraft::new(
            MovementKind::TransferCashToBank,
            Account::Cash,
            Money::from_cents(100),
            false,
        );
        let bank_leg = MovementDraft::new(
            MovementKind::TransferCashToBank,
            Account::Bank,
            Money::from_cents(100),
            true,
        );
        assert_eq!(cash_leg.validate().unwrap(), Account::Cash);
        assert_eq!(bank_leg.validate().unwrap(), Account::Bank);
    }

    #[test]
    fn adjustments_accept_either_polarity() {
        for credit in [true, false] {
            let draft = MovementDraft::new(
                MovementKind::ManualAdjustmentBank,
                Account::Bank,
                Money::from_cents(100),
                credit,
            );
            assert!(draft.validate().is_ok());
        }
    }

    #[test]
    fn into_movement_defaults_timestamp_to_now() {
        let m = MovementDraft::new(
            MovementKind::WithdrawalCash,
            Account::Cash,
            Money::from_cents(2_000),
            false,
        )
        .memo("petty cash")
        .into_movement(MovementId::new(), now())
        .unwrap();

        assert_eq!(m.timestamp, now());
        assert_eq!(m.recorded_at, now());
        assert!(m.affects_cash());
        assert!(!m.affects_bank());
        assert_eq!(m.signed_amount(), Money::from_cents(-2_000));
    }

    #[test]
    fn business_date_uses_offset() {
        let late_utc = Utc.with_ymd_and_hms(2026, 5, 5, 1, 0, 0).unwrap();
        let m = MovementDraft::new(
            MovementKind::SaleCash,
            Account::Cash,
            Money::from_cents(100),
            true,
        )
        .at(late_utc)
        .into_movement(MovementId::new(), now())
        .unwrap();

        let utc_minus_3 = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(m.business_date(utc_minus_3), NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(m.business_date(utc), NaiveDate::from_ymd_opt(2026, 5, 5).unwrap());
    }
}
