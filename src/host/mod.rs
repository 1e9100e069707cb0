//! Host session subsystem.
//!
//! The host is the process that owns the application session. The bridge
//! asks it whether the session already failed during startup, hands it
//! warmup batches, and reads the app identity from it.
//!
//! # Design Decisions
//! - Identity comes from an explicit [`AppConfig`], never ambient globals
//! - Warmup reporting is one call per HTML entry point

pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::address::Protocol;
use crate::error::BridgeResult;

pub use local::LocalHost;

/// A startup failure the host recorded for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedError {
    /// Error code, when the failure carried one.
    pub code: Option<String>,
    pub message: String,
}

/// Application identity and mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Development mode: header-less requests from the dev tooling are trusted.
    pub dev: bool,
    /// Session id, `<key>@<startId>`.
    pub id: String,
    /// Application name, shown on diagnostic pages.
    pub name: String,
}

/// Application version triple.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Versions {
    pub fork: u64,
    pub length: u64,
    pub key: String,
}

impl Versions {
    /// Render as `v.<fork>.<length>.<key>`.
    pub fn label(&self) -> String {
        format!("v.{}.{}.{}", self.fork, self.length, self.key)
    }
}

/// One pre-rendered commonjs module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupEntry {
    pub filename: String,
    pub source: String,
}

/// The warmup report for one entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupBatch {
    #[serde(with = "protocol_name")]
    pub protocol: Protocol,
    pub batch: Vec<WarmupEntry>,
}

/// The host process as seen from the bridge.
#[async_trait]
pub trait Host: Send + Sync {
    /// Startup failure recorded for `start_id`, if any.
    async fn reported(&self, start_id: &str) -> BridgeResult<Option<ReportedError>>;

    /// Receive a warmup batch.
    async fn warmup(&self, batch: WarmupBatch) -> BridgeResult<()>;

    /// Application identity and mode.
    async fn config(&self) -> BridgeResult<AppConfig>;

    /// Application version triple.
    async fn versions(&self) -> BridgeResult<Versions>;
}

/// The start id is the part of a session id after `@`.
pub fn start_id(session_id: &str) -> &str {
    session_id.split_once('@').map(|(_, start)| start).unwrap_or("")
}

mod protocol_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::address::Protocol;

    pub fn serialize<S: Serializer>(protocol: &Protocol, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(protocol.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Protocol, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_id_follows_at() {
        assert_eq!(start_id("0@a"), "a");
        assert_eq!(start_id("key@start@x"), "start@x");
        assert_eq!(start_id("0"), "");
    }

    #[test]
    fn version_label() {
        let versions = Versions {
            fork: 0,
            length: 100,
            key: "key".into(),
        };
        assert_eq!(versions.label(), "v.0.100.key");
    }

    #[test]
    fn batch_serializes_protocol_name() {
        let batch = WarmupBatch {
            protocol: Protocol::App,
            batch: vec![WarmupEntry {
                filename: "/a.js".into(),
                source: "module.exports = 1".into(),
            }],
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["protocol"], "app");
        let back: WarmupBatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, batch);
    }
}
