//! What to serve when the resolved file is missing.
//!
//! - HTML target: the waypoint, if configured and not already the target.
//! - Anything else: `<path>.html` or `<path>/index.html`, whichever the
//!   store holds, else the waypoint standing in for them.

use futures_util::future::join;

use crate::address::{Link, RouteParams};
use crate::engine::lookup::not_found;
use crate::engine::{Engine, Origin, Resolved};
use crate::error::BridgeResult;

impl Engine {
    pub(super) async fn fallback(&self, ctx: &RouteParams, filename: &str) -> BridgeResult<Resolved> {
        if filename.ends_with(".html") {
            return self.serve_waypoint(ctx, filename).await;
        }

        let base = ctx.path.trim_end_matches('/');
        let candidates = [
            ctx.with_path(format!("{base}.html")),
            ctx.with_path(format!("{base}/index.html")),
        ];

        // Probe both before re-entering so only the winner runs warmup.
        let (file, index) = join(self.present(&candidates[0]), self.present(&candidates[1])).await;

        let mut substitute = None;
        for (candidate, present) in candidates.into_iter().zip([file, index]) {
            if !present {
                continue;
            }
            match self.resolve_request(candidate).await {
                Ok(resolved) if resolved.origin == Origin::Direct => return Ok(resolved),
                Ok(resolved) => {
                    substitute.get_or_insert(resolved);
                }
                Err(e) => {
                    tracing::trace!(path = %ctx.path, error = %e, "Fallback candidate missed");
                }
            }
        }
        if let Some(resolved) = substitute {
            return Ok(resolved);
        }

        match self.serve_waypoint(ctx, filename).await {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                tracing::trace!(path = %ctx.path, error = %e, "Waypoint missed");
                Err(not_found(filename))
            }
        }
    }

    /// Serve the waypoint in place of `filename`.
    async fn serve_waypoint(&self, ctx: &RouteParams, filename: &str) -> BridgeResult<Resolved> {
        let Some(waypoint) = self.waypoint.as_deref().filter(|w| *w != ctx.path) else {
            return Err(not_found(filename));
        };

        tracing::debug!(path = %ctx.path, waypoint, "Serving waypoint for missing document");
        match self.resolve_request(ctx.with_path(waypoint)).await {
            Ok(resolved) => Ok(resolved.via_waypoint()),
            Err(e) if e.is_not_found() => Err(not_found(filename)),
            Err(e) => Err(e),
        }
    }

    /// Whether a fallback candidate names a stored file. Candidates that
    /// carry a specifier are left for the linker to decide. Store errors
    /// count as absent.
    async fn present(&self, ctx: &RouteParams) -> bool {
        let filename = match Link::parse(&ctx.address()) {
            Ok(link) => match link.filename {
                Some(filename) => self.mounted(&filename),
                None => return true,
            },
            Err(_) => return false,
        };
        match self.store.exists(&filename).await {
            Ok(present) => present,
            Err(e) => {
                tracing::trace!(key = %filename, error = %e, "Fallback probe failed");
                false
            }
        }
    }
}
