//! drive-bridge
//!
//! Serves an application directory over loopback HTTP the way the client
//! runtime expects: module specifiers resolved, scripts transformed, HTML
//! entry points warmed before they are served.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::Listener ──▶ http::BridgeServer ──▶ engine::Engine
//!                                        (x-pear / dev auth)    (lookup, fallback,
//!                                                                 not-found page)
//!                                                                    │
//!                                              ┌─────────────────────┼───────────────┐
//!                                              ▼                     ▼               ▼
//!                                         drive::ContentStore   linker::Linker   host::Host
//!     Client Response                                                       (reports, warmup)
//!     ◀────────────── http::response ◀── engine::Resolved
//! ```

use std::path::PathBuf;

use clap::Parser;

use drive_bridge::config::loader::{load_config, ConfigError};
use drive_bridge::config::validation::validate_config;
use drive_bridge::config::BridgeConfig;
use drive_bridge::lifecycle::startup;
use drive_bridge::observability::logging;

#[derive(Parser)]
#[command(name = "drive-bridge")]
#[command(about = "Local HTTP bridge for an application store", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve.
    #[arg(long)]
    root: Option<String>,

    /// Path prefix applied to store lookups.
    #[arg(long)]
    mount: Option<String>,

    /// HTML document served for unmatched HTML requests.
    #[arg(long)]
    waypoint: Option<String>,

    /// Path prefix exempt from the mount (repeatable).
    #[arg(long)]
    bypass: Vec<String>,

    /// Port to bind on loopback (0 picks a free port).
    #[arg(short, long)]
    port: Option<u16>,

    /// Trust header-less requests from the dev tools.
    #[arg(long)]
    dev: bool,
}

impl Cli {
    fn apply(self, config: &mut BridgeConfig) {
        if let Some(root) = self.root {
            config.store.root = root;
        }
        if let Some(mount) = self.mount {
            config.bridge.mount = mount;
        }
        if let Some(waypoint) = self.waypoint {
            config.bridge.waypoint = Some(waypoint);
        }
        if !self.bypass.is_empty() {
            config.bridge.bypass = self.bypass;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.dev {
            config.session.dev = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "drive-bridge starting");
    tracing::info!(
        root = %config.store.root,
        port = config.listener.port,
        dev = config.session.dev,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
