use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use cashbook_core::{LedgerError, LedgerResult};

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    let status = match &err {
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyClosed(_) => StatusCode::CONFLICT,
        LedgerError::Consistency { .. } | LedgerError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    match &err {
        LedgerError::InsufficientFunds {
            account,
            requested,
            available,
        } => (
            status,
            axum::Json(json!({
                "error": err.code(),
                "message": err.to_string(),
                "account": account,
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        LedgerError::Consistency {
            account,
            cached,
            recomputed,
        } => (
            status,
            axum::Json(json!({
                "error": err.code(),
                "message": err.to_string(),
                "account": account,
                "cached": cached,
                "recomputed": recomputed,
            })),
        )
            .into_response(),
        _ => json_error(status, err.code(), err.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Serialize `result` with `status`, or map the error.
pub fn respond<T: Serialize>(status: StatusCode, result: LedgerResult<T>) -> axum::response::Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(e) => ledger_error_to_response(e),
    }
}
