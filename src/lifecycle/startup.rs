//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the reference collaborators from configuration
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::drive::{ContentStore, LocalDrive};
use crate::engine::Engine;
use crate::host::LocalHost;
use crate::http::BridgeServer;
use crate::lifecycle::{signals, Shutdown};
use crate::linker::ScriptLinker;
use crate::net::Listener;
use crate::observability::metrics;

/// Build an engine over a directory store with the reference linker and host.
pub fn local_engine(config: &BridgeConfig) -> Engine {
    let store: Arc<dyn ContentStore> = Arc::new(LocalDrive::new(&config.store.root));
    let linker = ScriptLinker::new(Arc::clone(&store))
        .with_builtins(config.linker.builtins.iter().cloned())
        .with_symbol(config.linker.symbol.clone());
    let host = LocalHost::new(config.session.app_config());

    Engine::new(&config.bridge, store, Arc::new(linker), Arc::new(host))
}

/// Run the bridge described by `config` until Ctrl+C.
pub async fn run(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = Arc::new(local_engine(&config));
    tracing::info!(
        root = %config.store.root,
        mount = %config.bridge.normalized_mount(),
        waypoint = ?config.bridge.waypoint,
        "Content store ready"
    );

    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(url = %format!("http://localhost:{}", local_addr.port()), "Bridge listening");

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c(shutdown.clone());

    BridgeServer::new(&config, engine).run(listener, shutdown).await?;
    Ok(())
}
