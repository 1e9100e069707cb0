//! Request-to-resource resolution subsystem.
//!
//! # Data Flow
//! ```text
//! RouteParams (path, protocol, type) + session id
//!     → lookup.rs   (protocol gate, session check, address parse, mount,
//!                    specifier resolution, content-type decision)
//!     → fallback.rs (missing file: waypoint or .html / /index.html)
//!     → warmup.rs   (HTML entry points: report the commonjs graph)
//!     → not_found.rs (diagnostic page for not-found outcomes)
//!     → Resolved (status, content type, body)
//! ```
//!
//! # Responsibilities
//! - Turn one request context into content, a substitute, or a typed error
//! - Never mutate a request context: fallbacks build new ones
//!
//! # Design Decisions
//! - Collaborators are trait objects handed over at construction
//! - The engine holds no per-request state; one instance serves all requests
//! - Statuses other than the not-found page's 404 are decided by the dispatcher

mod fallback;
mod lookup;
mod not_found;
pub mod warmup;

use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;

use crate::config::MountConfig;
use crate::drive::{normalize_key, ContentStore};
use crate::host::Host;
use crate::linker::Linker;

pub use warmup::WarmupReporter;

/// Content type of a `resolve` protocol response.
pub const RESOLVED_PATH: &str = "text/plain; charset=UTF-8";

/// Content type of a source map response.
pub const SOURCE_MAP: &str = "application/json";

/// Where a successful lookup's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The requested path, or one of its `.html` / `/index.html` alternatives.
    Direct,
    /// The configured waypoint, standing in for a missing HTML document.
    Waypoint,
}

/// The outcome of a lookup, ready to be written as a response.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
    pub origin: Origin,
}

impl Resolved {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: content_type.into(),
            body: body.into(),
            origin: Origin::Direct,
        }
    }

    fn via_waypoint(self) -> Self {
        Self {
            origin: Origin::Waypoint,
            ..self
        }
    }
}

/// Resolves request contexts against the content store and linker.
pub struct Engine {
    mount: String,
    waypoint: Option<String>,
    bypass: Vec<String>,
    not_found_page: String,
    store: Arc<dyn ContentStore>,
    linker: Arc<dyn Linker>,
    host: Arc<dyn Host>,
    warmup: WarmupReporter,
}

impl Engine {
    pub fn new(
        config: &MountConfig,
        store: Arc<dyn ContentStore>,
        linker: Arc<dyn Linker>,
        host: Arc<dyn Host>,
    ) -> Self {
        let warmup = WarmupReporter::new(Arc::clone(&linker), Arc::clone(&host));
        Self {
            mount: config.normalized_mount(),
            waypoint: config.waypoint.clone(),
            bypass: config.bypass.clone(),
            not_found_page: normalize_key(&config.not_found_page),
            store,
            linker,
            host,
            warmup,
        }
    }

    /// The host session this engine reports to.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Prefix a concrete filename with the mount, unless a bypass prefix
    /// claims it.
    fn mounted(&self, filename: &str) -> String {
        if self.mount.is_empty() || self.bypass.iter().any(|prefix| bypasses(prefix, filename)) {
            filename.to_string()
        } else {
            format!("{}{}", self.mount, filename)
        }
    }
}

/// A bypass prefix claims the path itself and everything below it.
fn bypasses(prefix: &str, filename: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match filename.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MemoryDrive;
    use crate::host::{AppConfig, LocalHost};
    use crate::linker::ScriptLinker;

    fn engine(mount: &str, bypass: &[&str]) -> Engine {
        let store = Arc::new(MemoryDrive::new());
        let config = MountConfig {
            mount: mount.into(),
            bypass: bypass.iter().map(|s| s.to_string()).collect(),
            ..MountConfig::default()
        };
        let host = LocalHost::new(AppConfig {
            dev: false,
            id: "0@a".into(),
            name: "demo".into(),
        });
        Engine::new(
            &config,
            store.clone(),
            Arc::new(ScriptLinker::new(store)),
            Arc::new(host),
        )
    }

    #[test]
    fn mount_prefixes_unless_bypassed() {
        let engine = engine("ui", &["/node_modules"]);
        assert_eq!(engine.mounted("/index.html"), "/ui/index.html");
        assert_eq!(engine.mounted("/node_modules/x/y.js"), "/node_modules/x/y.js");
    }

    #[test]
    fn bypass_matches_whole_segments() {
        let engine = engine("/ui", &["/node_modules", "/assets/"]);
        assert_eq!(engine.mounted("/node_modules"), "/node_modules");
        assert_eq!(engine.mounted("/node_modules_private/x.js"), "/ui/node_modules_private/x.js");
        assert_eq!(engine.mounted("/assets/logo.png"), "/assets/logo.png");
        assert_eq!(engine.mounted("/assets.json"), "/ui/assets.json");
    }

    #[test]
    fn empty_mount_is_identity() {
        let engine = engine("", &[]);
        assert_eq!(engine.mounted("/index.html"), "/index.html");
    }

    #[test]
    fn not_found_page_key_is_normalized() {
        let engine = engine("", &[]);
        assert_eq!(engine.not_found_page, "/node_modules/drive-bridge/not-found.html");
    }
}
