//! The lookup state machine.

use futures_util::future::{BoxFuture, FutureExt};

use crate::address::{Link, ModuleType, Protocol, RouteParams};
use crate::content::mime;
use crate::engine::{Engine, Resolved, RESOLVED_PATH, SOURCE_MAP};
use crate::error::{BridgeError, BridgeResult};
use crate::host::start_id;
use crate::linker::ResolveOptions;

/// The not-found error for a concrete store path.
pub(super) fn not_found(filename: &str) -> BridgeError {
    BridgeError::NotFound(format!("Not Found: \"{filename}\""))
}

impl Engine {
    /// Resolve one request for the session `session_id`.
    ///
    /// Not-found outcomes, including a session that reported a startup
    /// failure, are answered with the not-found page. Every other failure
    /// is returned for the dispatcher to map onto a status.
    pub async fn lookup(&self, session_id: &str, ctx: RouteParams) -> BridgeResult<Resolved> {
        if !ctx.protocol.is_app_scope() {
            return Err(BridgeError::BadRequest("Unknown protocol".to_string()));
        }

        let outcome = match self.check_session(session_id).await {
            Ok(()) => self.resolve_request(ctx.clone()).await,
            Err(e) => Err(e),
        };

        match outcome {
            Err(err) if err.is_not_found() && ctx.protocol == Protocol::App => {
                tracing::debug!(path = %ctx.path, error = %err, "Serving not-found page");
                self.not_found_page(&ctx, err).await
            }
            other => other,
        }
    }

    async fn check_session(&self, session_id: &str) -> BridgeResult<()> {
        let start = start_id(session_id);
        match self.host.reported(start).await? {
            Some(reported) => {
                let code = reported.code.as_deref().unwrap_or("ERR_UNKNOWN");
                Err(BridgeError::NotFound(format!(
                    "Not Found - {code} - {}",
                    reported.message
                )))
            }
            None => Ok(()),
        }
    }

    /// Resolve a context without the session check or the not-found page.
    /// Fallbacks re-enter here with fresh contexts.
    pub(super) fn resolve_request(&self, ctx: RouteParams) -> BoxFuture<'_, BridgeResult<Resolved>> {
        async move {
            let mut link = Link::parse(&ctx.address())?;

            let filename = match link.filename.take() {
                Some(filename) => self.mounted(&filename),
                None => {
                    let specifier = link.resolve.clone().unwrap_or_default();
                    let dirname = link.dirname.clone().unwrap_or_else(|| "/".to_string());
                    let opts = ResolveOptions {
                        is_import: link.module_type.is_import(),
                    };
                    let resolved = self.linker.resolve(&specifier, &dirname, opts).await?;
                    link.builtin = resolved == specifier && self.linker.is_builtin(&specifier);
                    resolved
                }
            };
            if filename.is_empty() {
                return Err(not_found(&ctx.path));
            }
            link.filename = Some(filename.clone());

            let content_type = if ctx.protocol == Protocol::Resolve {
                None
            } else {
                let content_type = mime::classify(&filename);

                // An ES import of a wasm binary gets a loader script.
                if content_type == mime::WASM && link.module_type == ModuleType::Esm {
                    link.module_type = ModuleType::Wasm;
                    let out = self.linker.transform(&link).await?;
                    return Ok(Resolved::ok(mime::SCRIPT, out));
                }

                if link.module_type == ModuleType::App {
                    link.module_type = ModuleType::Esm;
                }
                if link.builtin {
                    let out = self.linker.transform(&link).await?;
                    return Ok(Resolved::ok(mime::SCRIPT, out));
                }
                Some(content_type)
            };

            if !self.store.exists(&filename).await? {
                return self.fallback(&ctx, &filename).await;
            }

            let Some(content_type) = content_type else {
                return Ok(Resolved::ok(RESOLVED_PATH, filename));
            };

            let is_source_map = link.module_type == ModuleType::Map;
            if mime::is_script(&content_type) || is_source_map {
                let out = self.linker.transform(&link).await?;
                let content_type = if is_source_map {
                    SOURCE_MAP.to_string()
                } else {
                    content_type
                };
                return Ok(Resolved::ok(content_type, out));
            }

            // The host must hold the warm cache before the document arrives.
            if ctx.protocol == Protocol::App && mime::is_html(&filename) {
                self.warmup.report(ctx.protocol, &filename).await?;
            }

            let body = self
                .store
                .get(&filename)
                .await?
                .ok_or_else(|| not_found(&filename))?;
            Ok(Resolved::ok(content_type, body))
        }
        .boxed()
    }
}
