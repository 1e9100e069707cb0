//! In-process host session backed by configuration.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::error::BridgeResult;
use crate::host::{AppConfig, Host, ReportedError, Versions, WarmupBatch};

const WARMUP_CHANNEL_CAPACITY: usize = 64;

/// A host living in the same process as the bridge.
///
/// Startup failures are recorded with [`LocalHost::report`]; warmup
/// batches are broadcast to every [`LocalHost::warming`] subscriber.
#[derive(Debug, Clone)]
pub struct LocalHost {
    app: AppConfig,
    versions: Versions,
    reported: Arc<DashMap<String, ReportedError>>,
    warming: broadcast::Sender<WarmupBatch>,
}

impl LocalHost {
    pub fn new(app: AppConfig) -> Self {
        let (warming, _) = broadcast::channel(WARMUP_CHANNEL_CAPACITY);
        Self {
            app,
            versions: Versions::default(),
            reported: Arc::new(DashMap::new()),
            warming,
        }
    }

    pub fn with_versions(mut self, versions: Versions) -> Self {
        self.versions = versions;
        self
    }

    /// Record a startup failure for `start_id`.
    pub fn report(&self, start_id: &str, err: ReportedError) {
        tracing::warn!(start_id, message = %err.message, "Session startup failure reported");
        self.reported.insert(start_id.to_string(), err);
    }

    /// Forget a recorded failure.
    pub fn clear_report(&self, start_id: &str) {
        self.reported.remove(start_id);
    }

    /// Subscribe to warmup batches.
    pub fn warming(&self) -> broadcast::Receiver<WarmupBatch> {
        self.warming.subscribe()
    }
}

#[async_trait]
impl Host for LocalHost {
    async fn reported(&self, start_id: &str) -> BridgeResult<Option<ReportedError>> {
        Ok(self.reported.get(start_id).map(|r| r.value().clone()))
    }

    async fn warmup(&self, batch: WarmupBatch) -> BridgeResult<()> {
        tracing::debug!(
            protocol = %batch.protocol,
            modules = batch.batch.len(),
            subscribers = self.warming.receiver_count(),
            "Warmup batch received"
        );
        // No subscribers is not an error: nobody is warming yet.
        let _ = self.warming.send(batch);
        Ok(())
    }

    async fn config(&self) -> BridgeResult<AppConfig> {
        Ok(self.app.clone())
    }

    async fn versions(&self) -> BridgeResult<Versions> {
        Ok(self.versions.clone())
    }
}
