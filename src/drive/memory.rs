//! In-process content store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::drive::{normalize_key, ContentStore, Entry};
use crate::error::BridgeResult;

#[derive(Debug, Clone)]
struct Stored {
    entry: Entry,
    bytes: Bytes,
}

/// A thread-safe map of store path to file bytes.
///
/// Cheap to clone; clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryDrive {
    files: Arc<DashMap<String, Stored>>,
    seq: Arc<AtomicU64>,
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` at `key`, replacing any previous content.
    pub fn insert(&self, key: &str, bytes: impl Into<Bytes>) {
        self.insert_with_metadata(key, bytes, serde_json::Value::Null);
    }

    /// Write `bytes` at `key` with writer metadata.
    pub fn insert_with_metadata(&self, key: &str, bytes: impl Into<Bytes>, metadata: serde_json::Value) {
        let key = normalize_key(key);
        let bytes = bytes.into();
        let entry = Entry {
            key: key.clone(),
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            size: bytes.len() as u64,
            metadata,
        };
        self.files.insert(key, Stored { entry, bytes });
    }

    pub fn remove(&self, key: &str) -> bool {
        self.files.remove(&normalize_key(key)).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryDrive {
    async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>> {
        Ok(self.files.get(&normalize_key(key)).map(|r| r.bytes.clone()))
    }

    async fn exists(&self, key: &str) -> BridgeResult<bool> {
        Ok(self.files.contains_key(&normalize_key(key)))
    }

    async fn entry(&self, key: &str) -> BridgeResult<Option<Entry>> {
        Ok(self.files.get(&normalize_key(key)).map(|r| r.entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_and_exists() {
        let drive = MemoryDrive::new();
        drive.insert("/index.html", "hello world");

        assert!(drive.exists("/index.html").await.unwrap());
        assert!(drive.exists("index.html").await.unwrap());
        assert!(!drive.exists("/other.html").await.unwrap());
        assert_eq!(
            drive.get("/index.html").await.unwrap(),
            Some(Bytes::from_static(b"hello world"))
        );
        assert_eq!(drive.get("/other.html").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_carry_size_and_sequence() {
        let drive = MemoryDrive::new();
        drive.insert("/a.js", "aa");
        drive.insert("/b.js", "bbb");

        let a = drive.entry("/a.js").await.unwrap().unwrap();
        let b = drive.entry("/b.js").await.unwrap().unwrap();
        assert_eq!(a.size, 2);
        assert_eq!(b.size, 3);
        assert!(a.seq < b.seq);
        assert_eq!(
            drive.compare("/a.js", "/b.js").await.unwrap(),
            std::cmp::Ordering::Less
        );
        assert_eq!(
            drive.compare("/missing", "/a.js").await.unwrap(),
            std::cmp::Ordering::Less
        );
    }

    #[tokio::test]
    async fn clones_share_files() {
        let drive = MemoryDrive::new();
        let other = drive.clone();
        other.insert("/x.txt", "x");
        assert_eq!(drive.len(), 1);
        assert!(drive.remove("/x.txt"));
        assert!(other.is_empty());
    }
}
