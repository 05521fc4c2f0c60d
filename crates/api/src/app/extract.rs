//! Body and query extractors whose rejections use the API's JSON error shape.
//!
//! Axum's own `Json`/`Query` rejections are plain text (and 422 for bodies, which
//! would read like `insufficient_funds`). These wrappers answer 400
//! `validation_error` instead.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;

use crate::app::errors;

fn invalid_input(message: String) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// JSON request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_input(rejection.body_text())),
        }
    }
}

/// Query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(invalid_input(rejection.body_text())),
        }
    }
}
