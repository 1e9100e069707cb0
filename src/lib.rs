//! Local HTTP bridge for content-addressable application stores.
//!
//! Serves files from a [`drive::ContentStore`] to a browser-like client,
//! resolving module specifiers and transforming scripts on the way out.

pub mod address;
pub mod config;
pub mod content;
pub mod drive;
pub mod engine;
pub mod error;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod linker;
pub mod net;
pub mod observability;

pub use config::schema::BridgeConfig;
pub use engine::Engine;
pub use error::{BridgeError, BridgeResult};
pub use http::BridgeServer;
pub use lifecycle::Shutdown;
