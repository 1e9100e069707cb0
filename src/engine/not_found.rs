//! The diagnostic page served for not-found outcomes.

use std::collections::HashMap;

use axum::http::StatusCode;

use crate::address::RouteParams;
use crate::content::{mime, template};
use crate::engine::{Engine, Origin, Resolved};
use crate::error::{BridgeError, BridgeResult};

impl Engine {
    /// Render the not-found page for `ctx`.
    ///
    /// When the store has no page, `err` is returned unchanged so the
    /// dispatcher answers with a plain 404.
    pub(super) async fn not_found_page(&self, ctx: &RouteParams, err: BridgeError) -> BridgeResult<Resolved> {
        let page = match self.store.get(&self.not_found_page).await {
            Ok(Some(page)) => page,
            Ok(None) => return Err(err),
            Err(e) => {
                tracing::warn!(key = %self.not_found_page, error = %e, "Failed to read not-found page");
                return Err(err);
            }
        };

        let app = self.host.config().await?;
        let versions = self.host.versions().await?;

        let mut locals = HashMap::new();
        locals.insert("url", ctx.path.clone());
        locals.insert("name", app.name);
        locals.insert("version", versions.label());

        let body = template::render(&String::from_utf8_lossy(&page), &locals);
        Ok(Resolved {
            status: StatusCode::NOT_FOUND,
            content_type: mime::HTML.to_string(),
            body: body.into(),
            origin: Origin::Direct,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::MountConfig;
    use crate::drive::MemoryDrive;
    use crate::host::{AppConfig, LocalHost, ReportedError, Versions};
    use crate::linker::ScriptLinker;

    const PAGE: &str = "<h1>{{ url }}</h1><p>{{name}} {{ version }}</p>";

    fn fixture(mount: &str) -> (MemoryDrive, LocalHost, Engine) {
        let drive = MemoryDrive::new();
        let host = LocalHost::new(AppConfig {
            dev: false,
            id: "key@start".into(),
            name: "demo".into(),
        })
        .with_versions(Versions {
            fork: 0,
            length: 7,
            key: "abc".into(),
        });
        let config = MountConfig {
            mount: mount.into(),
            ..MountConfig::default()
        };
        let engine = Engine::new(
            &config,
            Arc::new(drive.clone()),
            Arc::new(ScriptLinker::new(Arc::new(drive.clone()))),
            Arc::new(host.clone()),
        );
        (drive, host, engine)
    }

    #[tokio::test]
    async fn renders_locals() {
        let (drive, _host, engine) = fixture("");
        drive.insert("node_modules/drive-bridge/not-found.html", PAGE);

        let ctx = RouteParams::from_path("/missing.css").unwrap();
        let resolved = engine.lookup("key@start", ctx).await.unwrap();
        assert_eq!(resolved.status, StatusCode::NOT_FOUND);
        assert_eq!(resolved.content_type, mime::HTML);
        assert_eq!(&resolved.body[..], b"<h1>/missing.css</h1><p>demo v.0.7.abc</p>");
    }

    #[tokio::test]
    async fn page_is_read_outside_the_mount() {
        let (drive, _host, engine) = fixture("/ui");
        drive.insert("/node_modules/drive-bridge/not-found.html", PAGE);

        let ctx = RouteParams::from_path("/gone.js").unwrap();
        let resolved = engine.lookup("key@start", ctx).await.unwrap();
        assert_eq!(resolved.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reported_session_gets_the_page() {
        let (drive, host, engine) = fixture("");
        drive.insert("/index.html", "<p>app</p>");
        drive.insert("/node_modules/drive-bridge/not-found.html", PAGE);
        host.report(
            "start",
            ReportedError {
                code: Some("ERR_CRASH".into()),
                message: "boom".into(),
            },
        );

        let ctx = RouteParams::from_path("/").unwrap();
        let resolved = engine.lookup("key@start", ctx).await.unwrap();
        assert_eq!(resolved.status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8_lossy(&resolved.body).contains("/index.html"));
    }

    #[tokio::test]
    async fn resolve_protocol_skips_the_page() {
        let (drive, _host, engine) = fixture("");
        drive.insert("/node_modules/drive-bridge/not-found.html", PAGE);

        let ctx = RouteParams::from_path("/missing.js+resolve").unwrap();
        let err = engine.lookup("key@start", ctx).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
