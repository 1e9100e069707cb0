//! Splitting of the incoming HTTP path into routing parameters.

use crate::address::link::{ModuleType, Protocol};
use crate::error::{BridgeError, BridgeResult};

/// Request path served for `/`.
pub const ROOT_DOCUMENT: &str = "/index.html";

/// Routing parameters carried by one HTTP request path.
///
/// `GET /<path>+<protocol>+<type>` overrides the defaulted `app`/`app`
/// protocol and type. The suffix is stripped from the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    pub path: String,
    pub protocol: Protocol,
    pub module_type: ModuleType,
}

impl RouteParams {
    pub fn from_path(raw: &str) -> BridgeResult<Self> {
        let mut parts = raw.split('+');
        let path = parts.next().unwrap_or_default();
        let protocol = parts.next().unwrap_or("app");
        let module_type = parts.next().unwrap_or("app");

        let protocol: Protocol = protocol.parse()?;
        if !protocol.is_app_scope() {
            return Err(BridgeError::BadRequest("Unknown protocol".to_string()));
        }
        let module_type: ModuleType = module_type.parse()?;

        let path = if path == "/" || path.is_empty() {
            ROOT_DOCUMENT.to_string()
        } else {
            path.to_string()
        };

        Ok(Self {
            path,
            protocol,
            module_type,
        })
    }

    /// A new context for the same protocol and type at another path.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protocol: self.protocol,
            module_type: self.module_type,
        }
    }

    /// The composite address handed to [`Link::parse`](crate::address::Link::parse).
    pub fn address(&self) -> String {
        format!("{}://{}{}", self.protocol, self.module_type, self.path)
    }
}
