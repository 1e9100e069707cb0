//! Shared harness for integration tests: a bridge on an ephemeral loopback
//! port, backed by an in-memory store and an in-process host.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use drive_bridge::config::BridgeConfig;
use drive_bridge::drive::{ContentStore, MemoryDrive};
use drive_bridge::engine::Engine;
use drive_bridge::host::{AppConfig, LocalHost, Versions};
use drive_bridge::http::BridgeServer;
use drive_bridge::lifecycle::Shutdown;
use drive_bridge::linker::ScriptLinker;
use drive_bridge::net::{ConnectionRegistry, Listener};
use tokio::task::JoinHandle;

/// Session header every authorized test request carries.
pub const SESSION_HEADER: &str = "Pear 0@a";

pub struct TestBridge {
    pub addr: SocketAddr,
    pub drive: MemoryDrive,
    pub host: LocalHost,
    pub registry: ConnectionRegistry,
    pub client: reqwest::Client,
    shutdown: Shutdown,
    task: JoinHandle<()>,
}

impl TestBridge {
    /// Start a bridge with default configuration.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start a bridge after letting the test adjust its configuration.
    pub async fn start_with(configure: impl FnOnce(&mut BridgeConfig)) -> Self {
        let mut config = BridgeConfig::default();
        config.session.id = "0@a".into();
        config.session.name = "drive-bridge".into();
        config.linker.builtins = vec!["events".into()];
        configure(&mut config);

        let drive = MemoryDrive::new();
        let host = LocalHost::new(AppConfig {
            dev: config.session.dev,
            id: config.session.id.clone(),
            name: config.session.name.clone(),
        })
        .with_versions(Versions {
            fork: 0,
            length: 100,
            key: "key".into(),
        });

        let store: Arc<dyn ContentStore> = Arc::new(drive.clone());
        let linker = ScriptLinker::new(Arc::clone(&store)).with_builtins(config.linker.builtins.clone());
        let engine = Engine::new(&config.bridge, store, Arc::new(linker), Arc::new(host.clone()));

        let listener = Listener::bind(&config.listener).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = BridgeServer::new(&config, Arc::new(engine));
        let registry = server.registry();

        let shutdown = Shutdown::new();
        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                server.run(listener, shutdown).await.unwrap();
            })
        };

        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        Self {
            addr,
            drive,
            host,
            registry,
            client,
            shutdown,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET `path` with a valid session header.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("x-pear", SESSION_HEADER)
            .send()
            .await
            .unwrap()
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

/// The `content-type` header of a response.
pub fn content_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
