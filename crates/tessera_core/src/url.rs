use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStyle {
    #[default]
    Pretty,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    /// Site-relative link target.
    pub href: String,
    /// Output file relative to the build directory.
    pub primary_output: String,
}

#[derive(Debug, Clone, Copy)]
pub struct UrlMapper {
    style: UrlStyle,
}

impl UrlMapper {
    pub fn new(style: UrlStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> UrlStyle {
        self.style
    }

    pub fn map(&self, logical_key: &str) -> UrlMapping {
        let logical = logical_key.trim_matches('/');
        if logical.is_empty() {
            return UrlMapping {
                href: String::new(),
                primary_output: "index.html".to_string(),
            };
        }
        match self.style {
            UrlStyle::Html => UrlMapping {
                href: format!("{logical}.html"),
                primary_output: format!("{logical}.html"),
            },
            UrlStyle::Pretty => UrlMapping {
                href: format!("{logical}/"),
                primary_output: format!("{logical}/index.html"),
            },
        }
    }
}

/// Joins a base url and a site-relative path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_urls_end_with_slash() {
        let mapping = UrlMapper::new(UrlStyle::Pretty).map("/blog/post/");
        assert_eq!(mapping.href, "blog/post/");
        assert_eq!(mapping.primary_output, "blog/post/index.html");
    }

    #[test]
    fn html_urls_use_extension() {
        let mapping = UrlMapper::new(UrlStyle::Html).map("blog/post");
        assert_eq!(mapping.href, "blog/post.html");
        assert_eq!(mapping.primary_output, "blog/post.html");
    }

    #[test]
    fn root_maps_to_index() {
        let mapping = UrlMapper::new(UrlStyle::Html).map("/");
        assert_eq!(mapping.href, "");
        assert_eq!(mapping.primary_output, "index.html");
    }

    #[test]
    fn join_collapses_slashes() {
        assert_eq!(join_url("https://a.com/", "/b/"), "https://a.com/b/");
        assert_eq!(join_url("https://a.com", ""), "https://a.com/");
    }
}
