//! Extension to content-type classification.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Content type for scripts, after normalization.
pub const SCRIPT: &str = "application/javascript; charset=utf-8";

/// Content type for HTML documents, after normalization.
pub const HTML: &str = "text/html; charset=utf-8";

/// Content type for WebAssembly binaries.
pub const WASM: &str = "application/wasm";

/// Fallback for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

const DEFAULT_EXTENSION: &str = "js";

/// A map of file extensions to raw content types.
static TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Text types
    map.insert("html", "text/html");
    map.insert("htm", "text/html");
    map.insert("shtml", "text/html");
    map.insert("css", "text/css");
    map.insert("js", "text/javascript");
    map.insert("mjs", "text/javascript");
    map.insert("cjs", "application/node");
    map.insert("txt", "text/plain");
    map.insert("md", "text/markdown");
    map.insert("csv", "text/csv");

    // Application types
    map.insert("json", "application/json; charset=utf-8");
    map.insert("map", "application/json; charset=utf-8");
    map.insert("xml", "application/xml");
    map.insert("pdf", "application/pdf");
    map.insert("zip", "application/zip");
    map.insert("tar", "application/x-tar");
    map.insert("gz", "application/gzip");
    map.insert("wasm", WASM);

    // Image types
    map.insert("png", "image/png");
    map.insert("jpg", "image/jpeg");
    map.insert("jpeg", "image/jpeg");
    map.insert("gif", "image/gif");
    map.insert("svg", "image/svg+xml");
    map.insert("webp", "image/webp");
    map.insert("avif", "image/avif");
    map.insert("ico", "image/x-icon");

    // Audio types
    map.insert("mp3", "audio/mpeg");
    map.insert("wav", "audio/wav");
    map.insert("ogg", "audio/ogg");

    // Video types
    map.insert("mp4", "video/mp4");
    map.insert("webm", "video/webm");

    // Font types
    map.insert("ttf", "font/ttf");
    map.insert("otf", "font/otf");
    map.insert("woff", "font/woff");
    map.insert("woff2", "font/woff2");

    map
});

/// Classify a store path into the content type it is served with.
///
/// The extension is whatever follows the last `.`. A path with no `.` is
/// looked up whole, so `/LICENSE` is served as octet-stream, while the
/// empty path defaults to a script.
pub fn classify(path: &str) -> String {
    let ext = match path.rsplit('.').next() {
        Some("") | None => DEFAULT_EXTENSION.to_string(),
        Some(ext) => ext.to_ascii_lowercase(),
    };

    let Some(raw) = TYPES.get(ext.as_str()) else {
        return OCTET_STREAM.to_string();
    };

    let content_type = raw
        .replace("application/node", "application/javascript")
        .replace("text/javascript", "application/javascript");

    match content_type.as_str() {
        "application/javascript" | "text/html" => format!("{content_type}; charset=utf-8"),
        _ => content_type,
    }
}

/// True if the content type denotes a script the linker must transform.
pub fn is_script(content_type: &str) -> bool {
    content_type.starts_with("application/javascript")
}

/// True if the path names an HTML document.
pub fn is_html(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with(".htm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_script_and_markup() {
        let cases = [
            ("", SCRIPT),
            ("/path/to/file.aaa", OCTET_STREAM),
            ("/path/to/file.js", SCRIPT),
            ("/path/to/file.mjs", SCRIPT),
            ("/path/to/file.cjs", SCRIPT),
            ("/path/to/file.html", HTML),
            ("/path/to/file.htm", HTML),
            ("/path/to/file.shtml", HTML),
            ("/path/to/file.json", "application/json; charset=utf-8"),
            ("/path/to/file.map", "application/json; charset=utf-8"),
            ("/path/to/file.mp4", "video/mp4"),
        ];
        for (path, expected) in cases {
            assert_eq!(classify(path), expected, "path {path:?}");
        }
    }

    #[test]
    fn no_extension_is_octet_stream() {
        assert_eq!(classify("/LICENSE"), OCTET_STREAM);
        assert_eq!(classify("/dir.v2/README"), OCTET_STREAM);
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(classify("/IMAGE.PNG"), "image/png");
        assert_eq!(classify("/index.HTML"), HTML);
    }

    #[test]
    fn wasm_is_untouched() {
        assert_eq!(classify("/lib/add.wasm"), WASM);
        assert!(!is_script(WASM));
        assert!(is_script(&classify("/a.js")));
    }

    #[test]
    fn html_paths() {
        assert!(is_html("/index.html"));
        assert!(is_html("/legacy.htm"));
        assert!(!is_html("/index.js"));
    }
}
