//! Error taxonomy for the bridge.
//!
//! Every failure a request can hit is one of a closed set of kinds. The
//! dispatcher is the only place that turns a kind into an HTTP status, via
//! [`BridgeError::status`].

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while resolving or serving a request.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed address, missing/invalid auth, or unknown protocol.
    #[error("{0}")]
    BadRequest(String),

    /// No content at the resolved path after the full fallback chain,
    /// or the session reported a startup failure.
    #[error("{0}")]
    NotFound(String),

    /// The linker could not resolve a module specifier.
    #[error("{0}")]
    ModuleNotFound(String),

    /// The target was permanently removed.
    #[error("Gone")]
    Gone,

    /// The store or host session was torn down mid-request.
    #[error("Session Closed")]
    SessionClosed,

    /// Store or filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Build a bad-request error with the default message.
    pub fn bad_request() -> Self {
        Self::BadRequest("Bad Request".to_string())
    }

    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ModuleNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionClosed => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Gone => StatusCode::GONE,
            Self::Io(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the kinds that route to the not-found page.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for failures the status table has no entry for.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unexpected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert_eq!(BridgeError::ModuleNotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(BridgeError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(BridgeError::SessionClosed.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(BridgeError::bad_request().status(), StatusCode::BAD_REQUEST);
        assert_eq!(BridgeError::Gone.status(), StatusCode::GONE);
        assert_eq!(
            BridgeError::Unexpected("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_body_text() {
        let err = BridgeError::NotFound("Not Found: \"/a.js\"".into());
        assert_eq!(err.to_string(), "Not Found: \"/a.js\"");
        assert_eq!(BridgeError::Gone.to_string(), "Gone");
        assert_eq!(BridgeError::bad_request().to_string(), "Bad Request");
    }

    #[test]
    fn only_not_found_routes_to_page() {
        assert!(BridgeError::NotFound("x".into()).is_not_found());
        assert!(!BridgeError::ModuleNotFound("x".into()).is_not_found());
        assert!(!BridgeError::bad_request().is_not_found());
    }
}
