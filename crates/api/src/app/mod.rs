//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `extract.rs`: body/query extractors with JSON rejections
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use cashbook_infra::ServiceConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: ServiceConfig) -> Router {
    build_app_with(services::build_services(config))
}

/// Build the router over already constructed services.
pub fn build_app_with(services: services::AppServices) -> Router {
    let ledger_routes = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn(middleware::actor_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(ledger_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
