//! Lightweight source scanning: script tags, `require` calls, imports.
//!
//! These are lexical scans, not parsers. They look for string-literal
//! specifiers in the usual positions and ignore everything else.

/// A `<script src>` found in an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: String,
    /// `type="module"`.
    pub module: bool,
}

/// Every `<script>` tag with a `src` attribute, in document order.
pub fn script_tags(html: &str) -> Vec<ScriptTag> {
    let lower = html.to_ascii_lowercase();
    let mut tags = Vec::new();
    let mut offset = 0;

    while let Some(found) = lower[offset..].find("<script") {
        let start = offset + found + "<script".len();
        let Some(end) = lower[start..].find('>') else {
            break;
        };
        let attrs = &html[start..start + end];
        offset = start + end;

        if let Some(src) = attribute(attrs, "src") {
            let module = attribute(attrs, "type").is_some_and(|t| t.eq_ignore_ascii_case("module"));
            tags.push(ScriptTag { src, module });
        }
    }

    tags
}

/// Value of `name=` inside a tag's attribute text, quoted or bare.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let mut offset = 0;

    while let Some(found) = lower[offset..].find(name) {
        let at = offset + found;
        offset = at + name.len();

        let boundary = at == 0 || lower.as_bytes()[at - 1].is_ascii_whitespace();
        let rest = attrs[offset..].trim_start();
        if !boundary || !rest.starts_with('=') {
            continue;
        }

        let value = rest[1..].trim_start();
        return match value.chars().next() {
            Some(quote @ ('"' | '\'')) => value[1..].split(quote).next().map(str::to_string),
            Some(_) => value.split_ascii_whitespace().next().map(str::to_string),
            None => None,
        };
    }

    None
}

/// Specifiers passed to `require("...")`.
pub fn require_calls(source: &str) -> Vec<String> {
    quoted_after(source, "require(")
}

/// Specifiers of static `import ... from "..."`, `import "..."`,
/// `export ... from "..."` and dynamic `import("...")`.
pub fn import_specifiers(source: &str) -> Vec<String> {
    let mut specifiers = quoted_after(source, "from");
    specifiers.extend(quoted_after(source, "import"));
    specifiers.extend(quoted_after(source, "import("));
    specifiers.sort();
    specifiers.dedup();
    specifiers
}

/// True if any line starts with an `import` or `export` statement.
pub fn has_esm_syntax(source: &str) -> bool {
    source.lines().map(str::trim_start).any(|line| {
        ["import ", "import{", "import\"", "import'", "export ", "export{"]
            .iter()
            .any(|kw| line.starts_with(kw))
    })
}

/// String literals that directly follow `keyword` (after optional whitespace).
fn quoted_after(source: &str, keyword: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut offset = 0;

    while let Some(found) = source[offset..].find(keyword) {
        let at = offset + found;
        offset = at + keyword.len();

        let preceded_by_ident = source[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
        if preceded_by_ident {
            continue;
        }

        let rest = source[offset..].trim_start();
        let Some(quote @ ('"' | '\'' | '`')) = rest.chars().next() else {
            continue;
        };
        if let Some(literal) = rest[1..].split(quote).next() {
            if !literal.is_empty() && !literal.contains('\n') {
                out.push(literal.to_string());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_script_tags() {
        let html = r#"<html><head>
            <SCRIPT src="./vendor.js"></SCRIPT>
            <script type="module" src='/app.js'></script>
            <script>inline()</script>
            <script src=bare.js defer></script>
        </head></html>"#;
        let tags = script_tags(html);
        assert_eq!(
            tags,
            vec![
                ScriptTag { src: "./vendor.js".into(), module: false },
                ScriptTag { src: "/app.js".into(), module: true },
                ScriptTag { src: "bare.js".into(), module: false },
            ]
        );
    }

    #[test]
    fn ignores_data_src() {
        let tags = script_tags(r#"<script data-src="x.js" src="y.js"></script>"#);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].src, "y.js");
    }

    #[test]
    fn finds_requires() {
        let src = "const a = require('./a')\nconst b = require( \"b/c\" )\nfoo.require('no')";
        assert_eq!(require_calls(src), vec!["./a", "b/c"]);
    }

    #[test]
    fn finds_imports() {
        let src = "import x from './x.js'\nimport './side.js'\nexport { y } from \"y\"\nconst m = await import('./lazy.js')";
        assert_eq!(
            import_specifiers(src),
            vec!["./lazy.js", "./side.js", "./x.js", "y"]
        );
    }

    #[test]
    fn detects_esm() {
        assert!(has_esm_syntax("  import x from 'x'"));
        assert!(has_esm_syntax("export default 1"));
        assert!(!has_esm_syntax("module.exports = { important: 1 }"));
    }
}
