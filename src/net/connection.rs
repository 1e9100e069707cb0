//! Connection registry and lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Hold a close handle per live connection
//! - Force every connection closed at shutdown and wait for the drain

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{watch, Notify};

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Inner {
    live: DashMap<ConnectionId, watch::Sender<bool>>,
    drained: Notify,
}

/// Live connections, each with a handle that forces it closed.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection. The guard removes it on drop; its
    /// receiver flips to `true` when the connection must close.
    pub fn register(&self) -> ConnectionGuard {
        let id = ConnectionId::new();
        let (tx, rx) = watch::channel(false);
        self.inner.live.insert(id, tx);
        metrics::set_active_connections(self.inner.live.len());
        tracing::trace!(connection_id = %id, "Connection registered");
        ConnectionGuard {
            inner: Arc::clone(&self.inner),
            id,
            close: rx,
        }
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.inner.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.live.is_empty()
    }

    /// Signal every live connection to close.
    pub fn close_all(&self) {
        for entry in self.inner.live.iter() {
            let _ = entry.value().send(true);
        }
        tracing::debug!(connections = self.inner.live.len(), "Closing all connections");
    }

    /// Wait until every registered connection has been dropped.
    pub async fn wait_empty(&self) {
        loop {
            let drained = self.inner.drained.notified();
            tokio::pin!(drained);
            drained.as_mut().enable();
            if self.inner.live.is_empty() {
                return;
            }
            drained.await;
        }
    }
}

/// Guard that keeps a connection registered.
#[derive(Debug)]
pub struct ConnectionGuard {
    inner: Arc<Inner>,
    id: ConnectionId,
    close: watch::Receiver<bool>,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Resolves once the registry asks this connection to close.
    pub async fn closing(&mut self) {
        // Sender lives in the registry until this guard drops.
        let _ = self.close.wait_for(|close| *close).await;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.inner.live.remove(&self.id);
        metrics::set_active_connections(self.inner.live.len());
        if self.inner.live.is_empty() {
            self.inner.drained.notify_waiters();
        }
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn registry_counts() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());

        let guard1 = registry.register();
        let guard2 = registry.register();
        assert_eq!(registry.len(), 2);

        drop(guard1);
        assert_eq!(registry.len(), 1);

        drop(guard2);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn close_all_reaches_every_guard() {
        let registry = ConnectionRegistry::new();
        let mut guards = vec![registry.register(), registry.register()];

        registry.close_all();
        for guard in guards.iter_mut() {
            tokio::time::timeout(Duration::from_secs(1), guard.closing())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn wait_empty_returns_after_last_drop() {
        let registry = ConnectionRegistry::new();
        let guard = registry.register();

        let waiter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.wait_empty().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn wait_empty_on_empty_registry_is_immediate() {
        ConnectionRegistry::new().wait_empty().await;
    }
}
