use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Router,
};

use cashbook_core::MovementId;

use crate::app::dto::{self, CreatedResponse};
use crate::app::errors;
use crate::app::extract::{ValidatedJson, ValidatedQuery};
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movements).post(append_movement))
        .route("/:id", get(get_movement).delete(reverse_movement))
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    ValidatedQuery(query): ValidatedQuery<dto::ListMovementsQuery>,
) -> axum::response::Response {
    let result = query
        .into_parts()
        .and_then(|(filter, page)| services.ledger.list_movements(&filter, page));
    errors::respond(StatusCode::OK, result)
}

pub async fn append_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    ValidatedJson(body): ValidatedJson<dto::AppendMovementRequest>,
) -> axum::response::Response {
    let result = body
        .into_draft()
        .and_then(|draft| services.ledger.append(draft.recorded_by(actor.actor())))
        .map(|id| CreatedResponse { id });
    errors::respond(StatusCode::CREATED, result)
}

pub async fn get_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = id
        .parse::<MovementId>()
        .and_then(|id| services.ledger.get_movement(id));
    errors::respond(StatusCode::OK, result)
}

pub async fn reverse_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let result = id
        .parse::<MovementId>()
        .and_then(|id| services.ledger.reverse(id));
    errors::respond(StatusCode::OK, result)
}
