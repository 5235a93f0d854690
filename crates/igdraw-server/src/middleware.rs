use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Shared secret guarding the debug endpoints. `None` leaves them open.
#[derive(Debug, Clone, Default)]
pub struct DebugTokenState {
    token: Option<Arc<str>>,
}

impl DebugTokenState {
    #[must_use]
    pub fn new(token: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).map(Arc::from);
        if token.is_none() {
            tracing::warn!("IGDRAW_DEBUG_TOKEN not set; debug endpoints are unauthenticated");
        }
        Self { token }
    }

    fn allows(&self, candidate: Option<&str>) -> bool {
        match (&self.token, candidate) {
            (None, _) => true,
            (Some(expected), Some(given)) => {
                bool::from(given.as_bytes().ct_eq(expected.as_bytes()))
            }
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    token: Option<String>,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware checking the `?token=` query parameter against the debug token.
pub async fn require_debug_token(
    State(debug): State<DebugTokenState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DebugQuery>,
    req: Request,
    next: Next,
) -> Response {
    if debug.allows(query.token.as_deref()) {
        return next.run(req).await;
    }

    tracing::warn!(request_id = %req_id.0, "debug endpoint: rejected token");
    ApiError::new(req_id.0, "forbidden", "Forbidden").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_state_allows_anything() {
        let state = DebugTokenState::new(None);
        assert!(state.allows(None));
        assert!(state.allows(Some("whatever")));
    }

    #[test]
    fn blank_token_counts_as_unset() {
        let state = DebugTokenState::new(Some("   "));
        assert!(state.allows(None));
    }

    #[test]
    fn configured_token_must_match() {
        let state = DebugTokenState::new(Some("s3cret"));
        assert!(state.allows(Some("s3cret")));
        assert!(!state.allows(Some("s3cre")));
        assert!(!state.allows(Some("s3cret!")));
        assert!(!state.allows(None));
    }
}
