//! The parsed form of one request address.
//!
//! Grammar: `<protocol>://<type><path>`. A path of the form
//! `<dirname>/~<specifier>` names a bare module specifier to resolve;
//! any other path names a concrete store file.

use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, BridgeResult};

/// Marker separating a base directory from a bare specifier.
const SPECIFIER_MARKER: &str = "/~";

/// Address protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Application content.
    App,
    /// Path-only lookup used by tooling and the client runtime.
    Resolve,
    /// Platform content.
    Pear,
    /// Platform content under the legacy name.
    Holepunch,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Resolve => "resolve",
            Self::Pear => "pear",
            Self::Holepunch => "holepunch",
        }
    }

    /// True for the protocols served by an application bridge.
    pub fn is_app_scope(&self) -> bool {
        matches!(self, Self::App | Self::Resolve)
    }
}

impl FromStr for Protocol {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "resolve" => Ok(Self::Resolve),
            "pear" => Ok(Self::Pear),
            "holepunch" => Ok(Self::Holepunch),
            _ => Err(BridgeError::BadRequest("Unknown protocol".to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module-system hint carried by an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleType {
    /// Top-level application load; becomes `Esm` after content typing.
    App,
    Esm,
    Cjs,
    /// Source map for the addressed script.
    Map,
    /// JavaScript glue for an ESM import of a wasm binary.
    Wasm,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Map => "map",
            Self::Wasm => "wasm",
        }
    }

    /// True if a specifier under this type is resolved as an `import`.
    pub fn is_import(&self) -> bool {
        matches!(self, Self::App | Self::Esm)
    }
}

impl FromStr for ModuleType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "esm" => Ok(Self::Esm),
            "cjs" => Ok(Self::Cjs),
            "map" => Ok(Self::Map),
            "wasm" => Ok(Self::Wasm),
            other => Err(BridgeError::BadRequest(format!("Unknown module type: {other}"))),
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub protocol: Protocol,
    pub module_type: ModuleType,
    /// Base directory for a bare specifier.
    pub dirname: Option<String>,
    /// Raw specifier, present only while `filename` is unknown.
    pub resolve: Option<String>,
    /// Concrete store path, the sole store key once set.
    pub filename: Option<String>,
    /// Set when the specifier resolved to platform-provided code.
    pub builtin: bool,
}

impl Link {
    /// Link naming a concrete store file.
    pub fn file(protocol: Protocol, module_type: ModuleType, filename: impl Into<String>) -> Self {
        Self {
            protocol,
            module_type,
            dirname: None,
            resolve: None,
            filename: Some(filename.into()),
            builtin: false,
        }
    }

    /// Parse a full address such as `app://esm/lib/~react`.
    pub fn parse(address: &str) -> BridgeResult<Self> {
        let malformed = || BridgeError::BadRequest(format!("Bad Request (Malformed URL: {address})"));

        let (scheme, rest) = address.split_once("://").ok_or_else(malformed)?;
        let protocol: Protocol = scheme.parse().map_err(|_| malformed())?;
        let slash = rest.find('/').ok_or_else(malformed)?;
        let (host, raw_path) = rest.split_at(slash);
        let module_type: ModuleType = host.parse().map_err(|_| malformed())?;

        let path = decode(raw_path).ok_or_else(malformed)?;

        let link = match path.find(SPECIFIER_MARKER) {
            Some(idx) => {
                let specifier = &path[idx + SPECIFIER_MARKER.len()..];
                if specifier.is_empty() {
                    return Err(malformed());
                }
                let dirname = if idx == 0 { "/" } else { &path[..idx] };
                Self {
                    protocol,
                    module_type,
                    dirname: Some(dirname.to_string()),
                    resolve: Some(specifier.to_string()),
                    filename: None,
                    builtin: false,
                }
            }
            None => Self::file(protocol, module_type, path),
        };

        Ok(link)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.module_type)?;
        match (&self.filename, &self.dirname, &self.resolve) {
            (Some(filename), _, _) => f.write_str(filename),
            (None, Some(dirname), Some(specifier)) => {
                let dirname = dirname.trim_end_matches('/');
                write!(f, "{dirname}/~{specifier}")
            }
            _ => f.write_str("/"),
        }
    }
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape
/// and the decoded bytes must be valid UTF-8.
fn decode(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_concrete_file() {
        let link = Link::parse("app://app/index.html").unwrap();
        assert_eq!(link.protocol, Protocol::App);
        assert_eq!(link.module_type, ModuleType::App);
        assert_eq!(link.filename.as_deref(), Some("/index.html"));
        assert!(link.resolve.is_none());
        assert!(link.dirname.is_none());
    }

    #[test]
    fn parses_bare_specifier() {
        let link = Link::parse("resolve://esm/lib/views/~react-dom").unwrap();
        assert_eq!(link.protocol, Protocol::Resolve);
        assert_eq!(link.module_type, ModuleType::Esm);
        assert_eq!(link.dirname.as_deref(), Some("/lib/views"));
        assert_eq!(link.resolve.as_deref(), Some("react-dom"));
        assert!(link.filename.is_none());
    }

    #[test]
    fn specifier_at_root() {
        let link = Link::parse("app://cjs/~./util.js").unwrap();
        assert_eq!(link.dirname.as_deref(), Some("/"));
        assert_eq!(link.resolve.as_deref(), Some("./util.js"));
    }

    #[test]
    fn decodes_escapes() {
        let link = Link::parse("app://app/my%20file.txt").unwrap();
        assert_eq!(link.filename.as_deref(), Some("/my file.txt"));
    }

    #[test]
    fn rejects_invalid_escapes() {
        let err = Link::parse("app://app/%invalid%url%").unwrap_err();
        assert!(matches!(err, BridgeError::BadRequest(_)));
        assert!(err.to_string().contains("Malformed URL:"));
        assert!(Link::parse("app://app/bad%ff").is_err());
    }

    #[test]
    fn rejects_unknown_parts() {
        assert!(Link::parse("ftp://app/index.html").is_err());
        assert!(Link::parse("app://jsx/index.html").is_err());
        assert!(Link::parse("not an address").is_err());
    }

    #[test]
    fn displays_back_to_address() {
        let file = Link::parse("app://map/index.js").unwrap();
        assert_eq!(file.to_string(), "app://map/index.js");

        let bare = Link::parse("resolve://cjs/lib/~lodash").unwrap();
        assert_eq!(bare.to_string(), "resolve://cjs/lib/~lodash");
    }

    #[test]
    fn import_types() {
        assert!(ModuleType::App.is_import());
        assert!(ModuleType::Esm.is_import());
        assert!(!ModuleType::Cjs.is_import());
    }
}
