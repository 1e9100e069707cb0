//! Content store subsystem.
//!
//! # Data Flow
//! ```text
//! Resolution engine / linker
//!     → ContentStore trait (exists, get, entry, compare)
//!     → memory.rs (in-process map, used by tests and embedders)
//!     → local.rs  (directory on disk, used by the binary)
//! ```
//!
//! # Design Decisions
//! - Keys are store paths; implementations normalize them to a leading `/`
//! - Missing keys are `Ok(None)` / `Ok(false)`, never errors
//! - Implementations must tolerate concurrent lookups of the same key

pub mod local;
pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::BridgeResult;

pub use local::LocalDrive;
pub use memory::MemoryDrive;

/// Metadata the store keeps for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Store path.
    pub key: String,
    /// Monotonic write sequence, used for ordering.
    pub seq: u64,
    /// Content length in bytes.
    pub size: u64,
    /// Free-form metadata attached by the writer.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Byte-addressable storage for application files.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the bytes stored at `key`.
    async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>>;

    /// Whether `key` holds a file.
    async fn exists(&self, key: &str) -> BridgeResult<bool>;

    /// Metadata for `key`.
    async fn entry(&self, key: &str) -> BridgeResult<Option<Entry>>;

    /// Order two keys by write sequence. Missing keys sort first.
    async fn compare(&self, key_a: &str, key_b: &str) -> BridgeResult<Ordering> {
        let a = self.entry(key_a).await?.map(|e| e.seq);
        let b = self.entry(key_b).await?.map(|e| e.seq);
        Ok(a.cmp(&b))
    }
}

/// Normalize a store key to a single leading `/`.
pub fn normalize_key(key: &str) -> String {
    format!("/{}", key.trim_start_matches('/'))
}
