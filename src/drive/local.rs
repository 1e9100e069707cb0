//! Directory-backed content store.

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use bytes::Bytes;

use crate::drive::{normalize_key, ContentStore, Entry};
use crate::error::{BridgeError, BridgeResult};

/// Serves store paths from a directory on disk.
///
/// Keys map onto paths below `root`. Keys that would escape the root
/// (`..` components) never match.
#[derive(Debug, Clone)]
pub struct LocalDrive {
    root: PathBuf,
}

impl LocalDrive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let key = normalize_key(key);
        let relative = Path::new(key.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl ContentStore for LocalDrive {
    async fn get(&self, key: &str) -> BridgeResult<Option<Bytes>> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> BridgeResult<bool> {
        let Some(path) = self.path_for(key) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn entry(&self, key: &str) -> BridgeResult<Option<Entry>> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(BridgeError::Io(e)),
        };
        // Modification time stands in for the write sequence.
        let seq = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        Ok(Some(Entry {
            key: normalize_key(key),
            seq,
            size: meta.len(),
            metadata: serde_json::Value::Null,
        }))
    }
}

fn is_missing(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}
