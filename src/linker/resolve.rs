//! Path arithmetic and candidate probing for specifier resolution.

/// Extensions tried, in order, after the exact path.
const EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json"];

/// Directory index files tried after the extensions.
const INDEXES: &[&str] = &["/index.js", "/index.mjs", "/index.cjs", "/index.json"];

/// True for `./x`, `../x`, `/x`, `.` and `..`.
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Directory part of a store path. The root is its own directory.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Join `relative` onto `base` and normalize `.` and `..` segments.
///
/// An absolute `relative` replaces `base`. `..` never climbs above `/`.
pub fn join(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let start = if relative.starts_with('/') { "" } else { base };

    for segment in start.split('/').chain(relative.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Candidate store paths for a file-or-directory reference, in probe order.
pub fn candidates(base: &str) -> Vec<String> {
    let base = base.trim_end_matches('/');
    let mut out = Vec::with_capacity(1 + EXTENSIONS.len() + INDEXES.len());
    if !base.is_empty() {
        out.push(base.to_string());
        out.extend(EXTENSIONS.iter().map(|ext| format!("{base}{ext}")));
    }
    out.extend(INDEXES.iter().map(|index| format!("{base}{index}")));
    out
}

/// Split a package specifier into package name and optional subpath.
///
/// `react` → (`react`, None); `@scope/pkg/sub/file` → (`@scope/pkg`, `sub/file`).
pub fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    for (seen, (idx, _)) in specifier.match_indices('/').enumerate() {
        if seen + 1 == name_segments {
            split_at = Some(idx);
            break;
        }
    }

    let (name, sub) = match split_at {
        Some(idx) => (&specifier[..idx], Some(&specifier[idx + 1..])),
        None => (specifier, None),
    };

    if name.is_empty() || (name_segments == 2 && !name.contains('/')) {
        return None;
    }
    Some((name, sub.filter(|s| !s.is_empty())))
}

/// `node_modules` directories searched from `from` up to the root.
pub fn node_modules_dirs(from: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut current = join("/", from);
    loop {
        if !current.ends_with("/node_modules") {
            let prefix = current.trim_end_matches('/');
            dirs.push(format!("{prefix}/node_modules"));
        }
        if current == "/" {
            break;
        }
        current = dirname(&current).to_string();
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths() {
        assert_eq!(join("/lib/views", "./card.js"), "/lib/views/card.js");
        assert_eq!(join("/lib/views", "../util"), "/lib/util");
        assert_eq!(join("/lib", "../../../etc"), "/etc");
        assert_eq!(join("/lib", "/abs/x.js"), "/abs/x.js");
        assert_eq!(join("/", "."), "/");
    }

    #[test]
    fn dirname_of_paths() {
        assert_eq!(dirname("/lib/a.js"), "/lib");
        assert_eq!(dirname("/a.js"), "/");
        assert_eq!(dirname("a.js"), "/");
    }

    #[test]
    fn probe_order() {
        let c = candidates("/lib/util");
        assert_eq!(c[0], "/lib/util");
        assert_eq!(c[1], "/lib/util.js");
        assert!(c.contains(&"/lib/util/index.js".to_string()));
        assert_eq!(candidates("/")[0], "/index.js");
    }

    #[test]
    fn package_names() {
        assert_eq!(split_package("react"), Some(("react", None)));
        assert_eq!(split_package("react-dom/client"), Some(("react-dom", Some("client"))));
        assert_eq!(split_package("@scope/pkg"), Some(("@scope/pkg", None)));
        assert_eq!(
            split_package("@scope/pkg/sub/file.js"),
            Some(("@scope/pkg", Some("sub/file.js")))
        );
        assert_eq!(split_package("@scope"), None);
    }

    #[test]
    fn node_modules_walk_up() {
        assert_eq!(
            node_modules_dirs("/app/lib"),
            vec!["/app/lib/node_modules", "/app/node_modules", "/node_modules"]
        );
        assert_eq!(node_modules_dirs("/"), vec!["/node_modules"]);
        assert_eq!(
            node_modules_dirs("/node_modules/a"),
            vec!["/node_modules/a/node_modules", "/node_modules"]
        );
    }

    #[test]
    fn path_specifiers() {
        assert!(is_path_specifier("./a"));
        assert!(is_path_specifier("../a"));
        assert!(is_path_specifier("/a"));
        assert!(!is_path_specifier("react"));
        assert!(!is_path_specifier(".hidden"));
    }
}
