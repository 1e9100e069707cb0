//! Request identification and session extraction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Decide the session a request belongs to (`x-pear` header or dev mode)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A present but invalid `x-pear` header is never rescued by dev mode

use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::{BridgeError, BridgeResult};
use crate::host::Host;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Header carrying the session, `Pear <sessionId>`.
pub const X_PEAR: HeaderName = HeaderName::from_static("x-pear");

/// Required prefix of the `x-pear` header.
const SESSION_SCHEME: &str = "Pear";

/// Bytes stripped from the `x-pear` value to get the session id.
const SESSION_PREFIX_LEN: usize = 5;

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID set by the request-id layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Determine the session id for a request.
///
/// With an `x-pear` header, it must start with `Pear` and the id is what
/// follows `Pear `. Without one, the request is trusted only in dev mode:
/// the user agent contains `dev_marker` and the host runs with `dev` set,
/// in which case the host's own session id is used.
pub async fn session_id(headers: &HeaderMap, host: &dyn Host, dev_marker: &str) -> BridgeResult<String> {
    if let Some(value) = headers.get(X_PEAR) {
        return value
            .to_str()
            .ok()
            .filter(|v| v.starts_with(SESSION_SCHEME))
            .map(|v| v.get(SESSION_PREFIX_LEN..).unwrap_or_default().to_string())
            .ok_or_else(BridgeError::bad_request);
    }

    let from_dev_tools = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ua| ua.contains(dev_marker));
    if from_dev_tools {
        let app = host.config().await?;
        if app.dev {
            tracing::debug!(session_id = %app.id, "Accepting dev tools request without x-pear");
            return Ok(app.id);
        }
    }

    Err(BridgeError::bad_request())
}
