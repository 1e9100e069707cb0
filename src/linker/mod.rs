//! Module resolution and transform subsystem.
//!
//! # Data Flow
//! ```text
//! Link with a bare specifier
//!     → Linker::resolve (specifier + dirname → store path, or builtin)
//! Link with a filename
//!     → Linker::transform (wrap, annotate, source map, wasm glue)
//! HTML entry point
//!     → Linker::warmup (walk the script graph, pre-render modules)
//! ```
//!
//! # Design Decisions
//! - The engine only sees the [`Linker`] trait; `ScriptLinker` is one
//!   implementation over any [`ContentStore`](crate::drive::ContentStore)
//! - Builtin detection is a capability query, the set stays in the linker

pub mod resolve;
pub mod scan;
pub mod script;
pub mod transform;

use async_trait::async_trait;

use crate::address::Link;
use crate::error::BridgeResult;

pub use script::ScriptLinker;

/// Options for [`Linker::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    /// Resolve as an ESM `import` rather than a `require`.
    pub is_import: bool,
}

/// Module system of a discovered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// ES module, fetched lazily per import by the client.
    Module,
    /// CommonJS module, pre-seeded into the client runtime.
    CommonJs,
}

/// One module discovered while warming an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub kind: ModuleKind,
    pub source: String,
}

impl Module {
    pub fn is_esm(&self) -> bool {
        self.kind == ModuleKind::Module
    }

    /// Render the module as a commonjs function body the client runtime
    /// can evaluate without another round trip.
    pub fn to_cjs(&self) -> String {
        transform::commonjs_function(&self.source)
    }
}

/// Turns specifiers into store paths and store files into script text.
#[async_trait]
pub trait Linker: Send + Sync {
    /// Resolve `specifier` relative to `dirname`.
    ///
    /// Fails with [`BridgeError::ModuleNotFound`](crate::error::BridgeError::ModuleNotFound)
    /// when nothing matches. A builtin resolves to itself.
    async fn resolve(&self, specifier: &str, dirname: &str, opts: ResolveOptions) -> BridgeResult<String>;

    /// Whether `specifier` names platform-provided code.
    fn is_builtin(&self, specifier: &str) -> bool;

    /// Produce the executable text for a resolved link.
    async fn transform(&self, link: &Link) -> BridgeResult<String>;

    /// Resolve the module graph reachable from an HTML entry point.
    async fn warmup(&self, entry: &str) -> BridgeResult<Vec<(String, Module)>>;
}
