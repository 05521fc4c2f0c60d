use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::NaiveDate;

use cashbook_core::{LedgerError, LedgerResult, Money};
use cashbook_ledger::Pagination;

use crate::app::dto::{self, ClosureResponse, ItemsResponse};
use crate::app::errors;
use crate::app::extract::{ValidatedJson, ValidatedQuery};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_closures).post(close_day))
        .route("/:date", get(get_closure))
}

fn parse_date(raw: &str) -> LedgerResult<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|e| LedgerError::validation(format!("invalid date '{raw}': {e}")))
}

pub async fn close_day(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::CloseDayRequest>,
) -> axum::response::Response {
    let result = Money::new(body.counted_cash)
        .and_then(|counted| {
            services
                .closures
                .close_day(body.date, counted, body.notes, actor.actor())
        })
        .map(ClosureResponse::from);
    errors::respond(StatusCode::CREATED, result)
}

pub async fn get_closure(
    Extension(services): Extension<Arc<AppServices>>,
    Path(date): Path<String>,
) -> axum::response::Response {
    let result = parse_date(&date).and_then(|date| {
        services
            .closures
            .get_closure(date)?
            .map(ClosureResponse::from)
            .ok_or_else(|| LedgerError::not_found(format!("no closure for {date}")))
    });
    errors::respond(StatusCode::OK, result)
}

pub async fn list_closures(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedQuery(page): ValidatedQuery<dto::PageQuery>,
) -> axum::response::Response {
    let result = services
        .closures
        .list_closures(Pagination::new(page.limit, page.offset))
        .map(|closures| ItemsResponse {
            items: closures.into_iter().map(ClosureResponse::from).collect(),
        });
    errors::respond(StatusCode::OK, result)
}

pub async fn day_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Path(date): Path<String>,
) -> axum::response::Response {
    let result = parse_date(&date).and_then(|date| services.closures.day_summary(date));
    errors::respond(StatusCode::OK, result)
}
