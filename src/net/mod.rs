//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (registry entry with a close handle)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Active → Closing (forced by shutdown) → Closed (guard dropped)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection registered so shutdown can force it closed
//! - Loopback only: the bridge never serves other hosts

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionRegistry};
pub use listener::{Listener, ListenerError};
