use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::dom;

const EPOCHS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[([a-z]+)=?([a-z0-9]+)?\](.+?)\[/[a-z]+\]?")
        .expect("Invalid shortcode regex")
});

/// Largest whole unit in `seconds`, e.g. `(3, "day")`. Zero or negative
/// spans yield `(0, "second")`.
pub fn duration(seconds: i64) -> (i64, &'static str) {
    for (epoch, length) in EPOCHS {
        let interval = seconds / length;
        if interval >= 1 {
            return (interval, epoch);
        }
    }
    (0, "second")
}

/// `3 days ago`, `1 hour ago`, `0 seconds ago`.
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (interval, epoch) = duration((now - date).num_seconds());
    let suffix = if interval == 1 { "" } else { "s" };
    format!("{interval} {epoch}{suffix} ago")
}

/// `02 Jan, 2024`.
pub fn formatted_date(date: DateTime<Utc>) -> String {
    date.format("%d %b, %Y").to_string()
}

/// Drops double quotes, collapses whitespace and cuts at `max_chars` with `...`.
/// Returns `None` when nothing is left.
pub fn truncate_string(text: &str, max_chars: usize) -> Option<String> {
    let cleaned = text
        .replace('"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() <= max_chars {
        return Some(cleaned);
    }
    let cut: String = cleaned.chars().take(max_chars).collect();
    Some(format!("{cut}..."))
}

pub fn truncate_str(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Removes `[name=arg]body[/name]` shortcodes.
pub fn strip_shortcodes(html: &str) -> String {
    SHORTCODE_RE.replace_all(html, "").into_owned()
}

/// Plain text of `html` without shortcodes and without the contents of
/// `pre`, `h1` and `h2` elements.
pub fn strip_tags(html: &str) -> String {
    let raw = strip_shortcodes(html);
    let document = dom::parse_html_document(&raw);
    let Some(body) = dom::find_element(&document.document, "body") else {
        return String::new();
    };
    let mut removed = Vec::new();
    dom::collect_elements(
        &body,
        &|handle: &Handle| matches!(dom::element_name(handle), Some("pre" | "h1" | "h2")),
        &mut removed,
    );
    for element in &removed {
        dom::clear_children(element);
    }
    dom::text_content(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("timestamp")
    }

    #[test]
    fn duration_picks_largest_unit() {
        assert_eq!(duration(3 * 86_400 + 5), (3, "day"));
        assert_eq!(duration(90), (1, "minute"));
        assert_eq!(duration(45), (45, "second"));
        assert_eq!(duration(400 * 86_400), (1, "year"));
        assert_eq!(duration(0), (0, "second"));
        assert_eq!(duration(-30), (0, "second"));
    }

    #[test]
    fn time_ago_pluralizes() {
        let now = at(1_700_000_000);
        assert_eq!(time_ago(at(1_700_000_000 - 3_600), now), "1 hour ago");
        assert_eq!(time_ago(at(1_700_000_000 - 7_200), now), "2 hours ago");
        assert_eq!(time_ago(now, now), "0 seconds ago");
    }

    #[test]
    fn formats_dates() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).single().expect("date");
        assert_eq!(formatted_date(date), "02 Jan, 2024");
    }

    #[test]
    fn truncation_helpers() {
        assert_eq!(
            truncate_string("  say \"hi\"\n  there ", 50).as_deref(),
            Some("say hi there")
        );
        assert_eq!(truncate_string("abcdef", 3).as_deref(), Some("abc..."));
        assert_eq!(truncate_string(" \" ", 3), None);
        assert_eq!(truncate_str("abcdef", 4), "abcd...");
        assert_eq!(truncate_str("abc", 4), "abc");
    }

    #[test]
    fn strips_shortcodes_and_headings() {
        assert_eq!(
            strip_shortcodes("a [youtube=abc123]video[/youtube] b"),
            "a  b"
        );
        let text = strip_tags("<h1>Title</h1><p>Body [note]x[/note]text</p><pre>code</pre><h3>kept</h3>");
        assert_eq!(text, "Body textkept");
    }
}
