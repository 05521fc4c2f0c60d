use axum::{
    routing::{get, post},
    Router,
};

pub mod balances;
pub mod closures;
pub mod movements;
pub mod payments;
pub mod system;

/// Router for all ledger endpoints (actor-aware).
pub fn router() -> Router {
    Router::new()
        .nest("/balances", balances::router())
        .nest("/movements", movements::router())
        .nest("/closures", closures::router())
        .route("/summary/:date", get(closures::day_summary))
        .route("/sales/payments", post(payments::sale_payment))
        .route("/purchases/payments", post(payments::purchase_payment))
        .route("/withdrawals", post(payments::withdrawal))
        .route("/expenses", post(payments::expense))
        .route("/transfers", post(payments::transfer))
        .route("/adjustments", post(payments::adjustment))
        .route("/opening-balances", post(payments::opening_balance))
}
