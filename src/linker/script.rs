//! Store-backed linker.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;

use crate::address::{Link, ModuleType};
use crate::drive::ContentStore;
use crate::error::{BridgeError, BridgeResult};
use crate::linker::resolve::{self, candidates, is_path_specifier, join, node_modules_dirs, split_package};
use crate::linker::scan;
use crate::linker::transform;
use crate::linker::{Linker, Module, ModuleKind, ResolveOptions};

/// Upper bound on modules visited by one warmup walk.
const WARMUP_LIMIT: usize = 1024;

/// Resolves and transforms scripts held in a [`ContentStore`].
pub struct ScriptLinker {
    store: Arc<dyn ContentStore>,
    builtins: HashSet<String>,
    symbol: String,
}

impl ScriptLinker {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            builtins: HashSet::new(),
            symbol: "bridge".to_string(),
        }
    }

    pub fn with_builtins<I, S>(mut self, builtins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtins = builtins.into_iter().map(Into::into).collect();
        self
    }

    /// Name of the runtime registry builtins are read from.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    async fn first_existing(&self, base: &str) -> BridgeResult<Option<String>> {
        for candidate in candidates(base) {
            if self.store.exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn resolve_package(&self, specifier: &str, dirname: &str, is_import: bool) -> BridgeResult<Option<String>> {
        let Some((name, subpath)) = split_package(specifier) else {
            return Ok(None);
        };

        for dir in node_modules_dirs(dirname) {
            let package_dir = format!("{dir}/{name}");
            if let Some(subpath) = subpath {
                if let Some(found) = self.first_existing(&format!("{package_dir}/{subpath}")).await? {
                    return Ok(Some(found));
                }
                continue;
            }

            if let Some(entry) = self.package_entry(&package_dir, is_import).await? {
                if let Some(found) = self.first_existing(&join(&package_dir, &entry)).await? {
                    return Ok(Some(found));
                }
            }
            if let Some(found) = self.first_existing(&format!("{package_dir}/index")).await? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// `module` (for imports) or `main` from a package manifest.
    async fn package_entry(&self, package_dir: &str, is_import: bool) -> BridgeResult<Option<String>> {
        let Some(bytes) = self.store.get(&format!("{package_dir}/package.json")).await? else {
            return Ok(None);
        };
        let manifest: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(package = %package_dir, error = %e, "Ignoring unreadable package.json");
                return Ok(None);
            }
        };

        let fields: &[&str] = if is_import { &["module", "main"] } else { &["main"] };
        Ok(fields
            .iter()
            .find_map(|field| manifest.get(*field).and_then(|v| v.as_str()))
            .map(str::to_string))
    }

    async fn read_source(&self, filename: &str) -> BridgeResult<String> {
        let bytes = self
            .store
            .get(filename)
            .await?
            .ok_or_else(|| BridgeError::NotFound(format!("Not Found: \"{filename}\"")))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn kind_of(filename: &str, source: &str) -> ModuleKind {
        if filename.ends_with(".mjs") {
            ModuleKind::Module
        } else if filename.ends_with(".cjs") {
            ModuleKind::CommonJs
        } else if scan::has_esm_syntax(source) {
            ModuleKind::Module
        } else {
            ModuleKind::CommonJs
        }
    }

    /// Specifiers a module depends on, in the syntax of its kind.
    fn dependencies(module: &Module) -> Vec<String> {
        match module.kind {
            ModuleKind::Module => scan::import_specifiers(&module.source),
            ModuleKind::CommonJs => scan::require_calls(&module.source),
        }
    }
}

#[async_trait]
impl Linker for ScriptLinker {
    async fn resolve(&self, specifier: &str, dirname: &str, opts: ResolveOptions) -> BridgeResult<String> {
        if self.is_builtin(specifier) {
            return Ok(specifier.to_string());
        }

        let found = if is_path_specifier(specifier) {
            self.first_existing(&join(dirname, specifier)).await?
        } else {
            self.resolve_package(specifier, dirname, opts.is_import).await?
        };

        found.ok_or_else(|| {
            BridgeError::ModuleNotFound(format!("Cannot find module '{specifier}' from '{dirname}'"))
        })
    }

    fn is_builtin(&self, specifier: &str) -> bool {
        self.builtins.contains(specifier)
    }

    async fn transform(&self, link: &Link) -> BridgeResult<String> {
        let filename = link
            .filename
            .as_deref()
            .ok_or_else(|| BridgeError::Unexpected(format!("Cannot transform unresolved link {link}")))?;

        if link.builtin {
            return Ok(transform::builtin_glue(filename, &self.symbol, link.module_type.is_import()));
        }
        if link.module_type == ModuleType::Wasm {
            return Ok(transform::wasm_glue());
        }

        let source = self.read_source(filename).await?;
        let kind = Self::kind_of(filename, &source);
        let wraps = kind == ModuleKind::CommonJs && link.module_type.is_import();
        let basename = filename.rsplit('/').next().unwrap_or(filename);
        let source_url = link.to_string();

        if link.module_type == ModuleType::Map {
            let header_lines = if kind == ModuleKind::CommonJs {
                transform::ESM_WRAPPER_HEADER_LINES
            } else {
                0
            };
            return Ok(transform::identity_source_map(basename, &source_url, &source, header_lines));
        }

        let text = if wraps {
            transform::esm_from_commonjs(&source)
        } else {
            source
        };
        let map_url = format!("{basename}+{}+map", link.protocol);
        Ok(transform::annotate(&text, &source_url, Some(&map_url)))
    }

    async fn warmup(&self, entry: &str) -> BridgeResult<Vec<(String, Module)>> {
        let html = self.read_source(entry).await?;
        let base = resolve::dirname(entry);

        let mut queue: VecDeque<(String, Option<ModuleKind>)> = scan::script_tags(&html)
            .into_iter()
            .filter(|tag| !tag.src.contains("://") && !tag.src.starts_with("//"))
            .map(|tag| {
                let hint = tag.module.then_some(ModuleKind::Module);
                (join(base, &tag.src), hint)
            })
            .collect();

        let mut seen = HashSet::new();
        let mut modules = Vec::new();

        while let Some((filename, hint)) = queue.pop_front() {
            if modules.len() >= WARMUP_LIMIT {
                tracing::warn!(entry, limit = WARMUP_LIMIT, "Warmup walk truncated");
                break;
            }
            if !seen.insert(filename.clone()) {
                continue;
            }

            let Some(bytes) = self.store.get(&filename).await? else {
                tracing::debug!(entry, filename = %filename, "Warmup skipping missing script");
                continue;
            };
            let source = String::from_utf8_lossy(&bytes).into_owned();
            let kind = hint.unwrap_or_else(|| Self::kind_of(&filename, &source));
            let module = Module { kind, source };

            let dirname = resolve::dirname(&filename).to_string();
            let opts = ResolveOptions {
                is_import: module.is_esm(),
            };
            for specifier in Self::dependencies(&module) {
                match self.resolve(&specifier, &dirname, opts).await {
                    Ok(resolved) if !self.is_builtin(&resolved) => queue.push_back((resolved, None)),
                    Ok(_) => {}
                    Err(BridgeError::ModuleNotFound(_)) => {
                        tracing::debug!(filename = %filename, specifier = %specifier, "Warmup skipping unresolved dependency");
                    }
                    Err(e) => return Err(e),
                }
            }

            modules.push((filename, module));
        }

        Ok(modules)
    }
}
