//! Response construction.
//!
//! # Responsibilities
//! - Write resolved content with its content type
//! - Map error kinds to status codes, with the message as a plain-text body
//!
//! # Design Decisions
//! - Failures outside the status table are logged at error level and
//!   answered with 500

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::engine::Resolved;
use crate::error::BridgeError;

const ERROR_CONTENT_TYPE: &str = "text/plain";

impl IntoResponse for Resolved {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        if self.is_unexpected() {
            tracing::error!(error = %self, "Unknown HTTP server error");
        }
        (
            self.status(),
            [(header::CONTENT_TYPE, ERROR_CONTENT_TYPE)],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn errors_are_plain_text() {
        let response = BridgeError::SessionClosed.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn resolved_keeps_its_type() {
        let response = Resolved::ok("text/css", "body {}").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }
}
