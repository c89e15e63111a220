//! Request ID middleware for request tracing and correlation.
//!
//! Reuses an `x-request-id` set by an upstream proxy when it looks sane,
//! otherwise generates a UUID v4. The ID is recorded on the current span,
//! tagged on the Sentry scope, stored in request extensions and echoed in
//! the response headers.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted verbatim.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The ID of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn from_header(value: Option<&HeaderValue>) -> Self {
        value
            .and_then(|h| h.to_str().ok())
            .filter(|id| is_acceptable(id))
            .map_or_else(|| Self(Uuid::new_v4().to_string()), |id| Self(id.to_string()))
    }
}

/// Upstream IDs end up in logs, so only short printable tokens are kept.
fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));

    // Record in current span for structured logging
    Span::current().record("request_id", request_id.0.as_str());

    // Set in Sentry scope for error correlation
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id.0);
    });

    let header = HeaderValue::from_str(&request_id.0).ok();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::from_header(parts.headers.get(REQUEST_ID_HEADER))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_kept() {
        let header = HeaderValue::from_static("cf-ray.8f2a_01");
        assert_eq!(
            RequestId::from_header(Some(&header)),
            RequestId("cf-ray.8f2a_01".to_string())
        );
    }

    #[test]
    fn test_missing_id_is_generated() {
        let id = RequestId::from_header(None);
        assert!(Uuid::parse_str(&id.0).is_ok());
    }

    #[test]
    fn test_suspicious_ids_are_replaced() {
        let spaced = HeaderValue::from_static("abc def");
        assert!(Uuid::parse_str(&RequestId::from_header(Some(&spaced)).0).is_ok());

        let long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        let long = HeaderValue::from_str(&long).ok();
        assert!(Uuid::parse_str(&RequestId::from_header(long.as_ref()).0).is_ok());
    }
}
