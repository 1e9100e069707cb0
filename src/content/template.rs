//! `{{name}}` placeholder substitution for diagnostic pages.

use std::collections::HashMap;

/// Replace every `{{key}}` in `template` with its value from `locals`.
///
/// Whitespace inside the braces is ignored. Unknown keys and unterminated
/// placeholders are left as written.
pub fn render(template: &str, locals: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        match locals.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locals() -> HashMap<&'static str, String> {
        HashMap::from([
            ("url", "/missing.html".to_string()),
            ("name", "demo".to_string()),
        ])
    }

    #[test]
    fn substitutes_known_keys() {
        let page = render("<h1>{{name}}</h1><p>{{ url }}</p>", &locals());
        assert_eq!(page, "<h1>demo</h1><p>/missing.html</p>");
    }

    #[test]
    fn leaves_unknown_and_unterminated() {
        assert_eq!(render("{{version}} ok", &locals()), "{{version}} ok");
        assert_eq!(render("tail {{name", &locals()), "tail {{name");
    }
}
