//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::host::AppConfig;

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Mount, waypoint and bypass settings for store lookups.
    pub bridge: MountConfig,

    /// Application session identity.
    pub session: SessionConfig,

    /// Content store settings.
    pub store: StoreConfig,

    /// Linker settings.
    pub linker: LinkerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host. The bridge is a loopback service.
    pub host: String,

    /// Bind port, 0 for an arbitrary free port.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 1_024,
        }
    }
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How request paths map onto store paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Prefix prepended to every concrete store path (e.g. "/ui").
    pub mount: String,

    /// HTML path served when no concrete HTML match exists.
    pub waypoint: Option<String>,

    /// Path prefixes exempt from mount prefixing.
    pub bypass: Vec<String>,

    /// Store key of the diagnostic page served on not-found.
    pub not_found_page: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount: String::new(),
            waypoint: None,
            bypass: Vec::new(),
            not_found_page: "/node_modules/drive-bridge/not-found.html".to_string(),
        }
    }
}

impl MountConfig {
    /// The mount prefix with a single leading `/` and no trailing `/`.
    /// Empty when unset.
    pub fn normalized_mount(&self) -> String {
        let trimmed = self.mount.trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }
}

/// Application session identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session id, `<key>@<startId>`.
    pub id: String,

    /// Development mode.
    pub dev: bool,

    /// Application name.
    pub name: String,

    /// User-agent substring identifying the dev tooling.
    pub user_agent_marker: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: "0@local".to_string(),
            dev: false,
            name: "app".to_string(),
            user_agent_marker: "pear-runtime".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            dev: self.dev,
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Content store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory served by the local store.
    pub root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
        }
    }
}

/// Linker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Module names provided by the platform.
    pub builtins: Vec<String>,

    /// Runtime registry symbol builtins are read from.
    pub symbol: String,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            builtins: Vec::new(),
            symbol: "bridge".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Time allowed for connections to close during shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_is_normalized() {
        let mut mount = MountConfig::default();
        assert_eq!(mount.normalized_mount(), "");
        mount.mount = "ui".into();
        assert_eq!(mount.normalized_mount(), "/ui");
        mount.mount = "/ui/".into();
        assert_eq!(mount.normalized_mount(), "/ui");
        mount.mount = "/".into();
        assert_eq!(mount.normalized_mount(), "");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [bridge]
            mount = "/ui"
            waypoint = "/index.html"

            [session]
            dev = true
            "#,
        )
        .unwrap();
        assert_eq!(config.bridge.mount, "/ui");
        assert_eq!(config.bridge.waypoint.as_deref(), Some("/index.html"));
        assert!(config.session.dev);
        assert_eq!(config.session.user_agent_marker, "pear-runtime");
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
