use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use cashbook_core::UserId;

use crate::app::errors;
use crate::context::ActorContext;

/// Header carrying the acting user's id (a UUID).
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Attach an [`ActorContext`] to every request. A malformed header is rejected
/// with 400; a missing one yields an anonymous context.
pub async fn actor_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let actor = extract_actor(req.headers()).map_err(|msg| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_actor", msg)
    })?;

    req.extensions_mut().insert(ActorContext::new(actor));
    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<Option<UserId>, String> {
    let Some(header) = headers.get(ACTOR_HEADER) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| format!("{ACTOR_HEADER} must be ASCII"))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse::<UserId>()
        .map(Some)
        .map_err(|e| format!("{ACTOR_HEADER}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_or_blank_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_actor(&headers), Ok(None));
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("  "));
        assert_eq!(extract_actor(&headers), Ok(None));
    }

    #[test]
    fn valid_uuid_is_accepted() {
        let id = UserId::new();
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(extract_actor(&headers), Ok(Some(id)));
    }

    #[test]
    fn garbage_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(extract_actor(&headers).is_err());
    }
}
