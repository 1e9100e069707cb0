//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper-util auto builder, Axum router, middleware)
//!     → request.rs (request ID, session from x-pear or dev mode)
//!     → engine (RouteParams → Resolved)
//!     → response.rs (content, or error kind → status + plain text)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_PEAR, X_REQUEST_ID};
pub use server::BridgeServer;
