//! Escaping helpers shared by the renderers

pub fn escape_html_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes only `&`, `<` and `>`, which is all highlighted code needs.
pub fn escape_code(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Joins non-empty class names with single spaces.
pub fn class_list<'a, I>(classes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    classes
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_escape_keeps_quotes() {
        assert_eq!(escape_code("a < \"b\" && c"), "a &lt; \"b\" &amp;&amp; c");
    }

    #[test]
    fn attr_escape_handles_both_quotes() {
        assert_eq!(escape_attr("it's \"x\""), "it&#39;s &quot;x&quot;");
    }

    #[test]
    fn class_list_skips_empty_entries() {
        assert_eq!(class_list(["a", "", "b"]), "a b");
    }
}
