use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::app::dto::BalancesResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(current_balances))
        .route("/recompute", post(recompute_balances))
        .route("/verify", get(verify_balances))
}

pub async fn current_balances(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.ledger.current_balances().map(BalancesResponse::from),
    )
}

pub async fn recompute_balances(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.ledger.recompute_balances().map(BalancesResponse::from),
    )
}

pub async fn verify_balances(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.ledger.verify_balances().map(BalancesResponse::from),
    )
}
