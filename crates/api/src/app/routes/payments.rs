//! Business-event endpoints: each records one movement (two for transfers).

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode};

use cashbook_core::Money;
use cashbook_ledger::{PurchaseRef, SaleRef};

use crate::app::dto::{self, CreatedResponse, TransferResponse};
use crate::app::errors;
use crate::app::extract::ValidatedJson;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn sale_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::SalePaymentRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services.ledger.record_sale_payment(
                SaleRef(body.sale_ref),
                body.account,
                amount,
                actor.actor(),
            )
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn purchase_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::PurchasePaymentRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services.ledger.record_purchase_payment(
                PurchaseRef(body.purchase_ref),
                body.account,
                amount,
                actor.actor(),
            )
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn withdrawal(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::DebitRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services
                .ledger
                .record_withdrawal(body.account, amount, body.memo, actor.actor())
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::DebitRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services
                .ledger
                .record_expense(body.account, amount, body.memo, actor.actor())
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::TransferRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services
                .ledger
                .transfer(body.direction, amount, body.memo, actor.actor())
        })
        .map(|(debit_id, credit_id)| TransferResponse {
            debit_id,
            credit_id,
        });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn adjustment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::AdjustmentRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services.ledger.adjust(
                body.account,
                body.direction,
                amount,
                &body.reason,
                actor.actor(),
            )
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn opening_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::OpeningBalanceRequest>,
) -> axum::response::Response {
    let result = Money::new(body.amount)
        .and_then(|amount| {
            services
                .ledger
                .record_opening_balance(body.account, amount, actor.actor())
        })
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}
