//! Warmup reporting for HTML entry points.
//!
//! Before an HTML document is served, the commonjs part of its module graph
//! is rendered and handed to the host so the client runtime can evaluate it
//! without a round trip per `require`. ES modules are left to the client,
//! which fetches them lazily per import.

use std::sync::Arc;

use crate::address::Protocol;
use crate::error::BridgeResult;
use crate::host::{Host, WarmupBatch, WarmupEntry};
use crate::linker::Linker;
use crate::observability::metrics;

#[derive(Clone)]
pub struct WarmupReporter {
    linker: Arc<dyn Linker>,
    host: Arc<dyn Host>,
}

impl WarmupReporter {
    pub fn new(linker: Arc<dyn Linker>, host: Arc<dyn Host>) -> Self {
        Self { linker, host }
    }

    /// Warm `entry` and report the batch. Returns the number of modules
    /// reported.
    pub async fn report(&self, protocol: Protocol, entry: &str) -> BridgeResult<usize> {
        let modules = self.linker.warmup(entry).await?;
        let discovered = modules.len();

        let batch: Vec<WarmupEntry> = modules
            .into_iter()
            .filter(|(_, module)| !module.is_esm())
            .map(|(filename, module)| WarmupEntry {
                source: module.to_cjs(),
                filename,
            })
            .collect();
        let reported = batch.len();

        tracing::debug!(
            entry,
            discovered,
            reported,
            "Reporting warmup batch"
        );
        metrics::record_warmup(reported);

        self.host.warmup(WarmupBatch { protocol, batch }).await?;
        Ok(reported)
    }
}
