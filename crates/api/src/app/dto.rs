use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashbook_core::{Account, LedgerResult, Money, MovementId};
use cashbook_ledger::{
    AdjustmentDirection, Balances, Closure, ClosureOutcome, MovementDraft, MovementFilter,
    MovementKind, Pagination, PurchaseRef, SaleRef, TransferDirection,
};

// -------------------------
// Request DTOs
// -------------------------

// Amounts arrive as plain decimals so that precision errors surface as
// validation failures rather than body rejections.

#[derive(Debug, Deserialize)]
pub struct SalePaymentRequest {
    pub sale_ref: String,
    pub account: Account,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PurchasePaymentRequest {
    pub purchase_ref: String,
    pub account: Account,
    pub amount: Decimal,
}

/// Body shared by withdrawals and expenses.
#[derive(Debug, Deserialize)]
pub struct DebitRequest {
    pub account: Account,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub direction: TransferDirection,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    pub account: Account,
    pub direction: AdjustmentDirection,
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct OpeningBalanceRequest {
    pub account: Account,
    pub amount: Decimal,
}

/// Raw movement in storage shape.
#[derive(Debug, Deserialize)]
pub struct AppendMovementRequest {
    pub kind: MovementKind,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub affects_cash: bool,
    pub affects_bank: bool,
    pub is_credit: bool,
    #[serde(default)]
    pub linked_sale: Option<String>,
    #[serde(default)]
    pub linked_purchase: Option<String>,
}

impl AppendMovementRequest {
    pub fn into_draft(self) -> LedgerResult<MovementDraft> {
        Ok(MovementDraft {
            kind: self.kind,
            amount: Money::new(self.amount)?,
            memo: self.memo,
            timestamp: self.timestamp,
            affects_cash: self.affects_cash,
            affects_bank: self.affects_bank,
            is_credit: self.is_credit,
            linked_sale: self.linked_sale.map(SaleRef),
            linked_purchase: self.linked_purchase.map(PurchaseRef),
            recorded_by: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CloseDayRequest {
    pub date: NaiveDate,
    pub counted_cash: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMovementsQuery {
    pub kind: Option<String>,
    pub account: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListMovementsQuery {
    pub fn into_parts(self) -> LedgerResult<(MovementFilter, Pagination)> {
        let filter = MovementFilter {
            kind: self.kind.as_deref().map(str::parse).transpose()?,
            account: self.account.as_deref().map(str::parse).transpose()?,
            from: self.from,
            to: self.to,
        };
        Ok((filter, Pagination::new(self.limit, self.offset)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: MovementId,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub debit_id: MovementId,
    pub credit_id: MovementId,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub cash: Money,
    pub bank: Money,
    pub total: Money,
}

impl From<Balances> for BalancesResponse {
    fn from(b: Balances) -> Self {
        Self {
            cash: b.cash,
            bank: b.bank,
            total: b.total(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClosureResponse {
    #[serde(flatten)]
    pub closure: Closure,
    pub outcome: ClosureOutcome,
}

impl From<Closure> for ClosureResponse {
    fn from(closure: Closure) -> Self {
        Self {
            outcome: closure.outcome(),
            closure,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_kind_and_account() {
        let q = ListMovementsQuery {
            kind: Some("sale-cash".into()),
            account: Some("Cash".into()),
            limit: Some(5),
            ..ListMovementsQuery::default()
        };
        let (filter, page) = q.into_parts().unwrap();
        assert_eq!(filter.kind, Some(MovementKind::SaleCash));
        assert_eq!(filter.account, Some(Account::Cash));
        assert_eq!(page.limit, 5);
    }

    #[test]
    fn query_rejects_unknown_kind() {
        let q = ListMovementsQuery {
            kind: Some("refund".into()),
            ..ListMovementsQuery::default()
        };
        assert!(q.into_parts().is_err());
    }

    #[test]
    fn draft_amount_precision_is_checked() {
        let req: AppendMovementRequest = serde_json::from_value(serde_json::json!({
            "kind": "expense",
            "amount": "1.005",
            "affects_cash": true,
            "affects_bank": false,
            "is_credit": false,
        }))
        .unwrap();
        assert!(req.into_draft().is_err());
    }
}
