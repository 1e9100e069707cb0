//! Text rewrites applied to served scripts.

use serde_json::json;

/// Lines the ESM wrapper inserts before a commonjs body.
pub const ESM_WRAPPER_HEADER_LINES: usize = 2;

/// Wrap a commonjs body so the client runtime can evaluate it later.
pub fn commonjs_function(source: &str) -> String {
    format!("(function (require, module, exports, __filename, __dirname) {{\n{source}\n}})")
}

/// Expose a commonjs body as an ES module whose default export is
/// `module.exports`.
pub fn esm_from_commonjs(source: &str) -> String {
    format!(
        "const module = {{ exports: {{}} }};\n\
         (function (module, exports) {{\n\
         {source}\n\
         }})(module, module.exports);\n\
         export default module.exports;\n"
    )
}

/// Append `sourceURL` and, when given, `sourceMappingURL` comments.
pub fn annotate(text: &str, source_url: &str, map_url: Option<&str>) -> String {
    let mut out = String::with_capacity(text.len() + source_url.len() + 64);
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("//# sourceURL=");
    out.push_str(source_url);
    if let Some(map_url) = map_url {
        out.push_str("\n//# sourceMappingURL=");
        out.push_str(map_url);
    }
    out.push('\n');
    out
}

/// A version 3 source map mapping each generated line back to the same
/// source line, shifted down by `header_lines`.
pub fn identity_source_map(file: &str, source_url: &str, source: &str, header_lines: usize) -> String {
    let lines = source.lines().count().max(1);
    let mut mappings = ";".repeat(header_lines);
    mappings.push_str("AAAA");
    for _ in 1..lines {
        mappings.push_str(";AACA");
    }

    json!({
        "version": 3,
        "file": file,
        "sources": [source_url],
        "sourcesContent": [source],
        "names": [],
        "mappings": mappings,
    })
    .to_string()
}

/// ES module that instantiates the wasm binary served next to it.
///
/// The binary is fetched from the module's own path with a `+app+cjs`
/// suffix, which the bridge answers with the raw bytes.
pub fn wasm_glue() -> String {
    "const url = new URL(import.meta.url);\n\
     url.pathname = url.pathname.split('+')[0] + '+app+cjs';\n\
     const { instance } = await WebAssembly.instantiateStreaming(fetch(url));\n\
     export default instance.exports;\n"
        .to_string()
}

/// Module text exposing a platform builtin from the runtime registry
/// published under `Symbol.for(symbol)`.
pub fn builtin_glue(name: &str, symbol: &str, as_esm: bool) -> String {
    let name = json!(name);
    let symbol = json!(symbol);
    let lookup = format!("globalThis[Symbol.for({symbol})].builtins[{name}]");
    if as_esm {
        format!("const mod = {lookup};\nexport default mod;\n")
    } else {
        format!("module.exports = {lookup};\n")
    }
}
