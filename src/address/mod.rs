//! Address codec subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP path  /lib/~react+resolve+esm
//!     → route.rs (strip +protocol+type suffix, default to app/app)
//!     → "resolve://esm/lib/~react"
//!     → link.rs (parse into Link: dirname=/lib, resolve=react)
//!     → Resolution engine
//! ```
//!
//! # Design Decisions
//! - Malformed addresses are bad requests, never not-found
//! - Percent-decoding is strict: stray `%` or invalid UTF-8 is rejected

pub mod link;
pub mod route;

pub use link::{Link, ModuleType, Protocol};
pub use route::{RouteParams, ROOT_DOCUMENT};
