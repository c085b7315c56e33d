use markup5ever_rcdom::Handle;

use crate::dom;

/// Share of the visible width one click scrolls.
pub const SCROLL_FRACTION: f64 = 0.8;
/// Rounding slack at either end of the scroll range.
pub const EDGE_THRESHOLD: f64 = 1.0;
pub const DISABLED_OPACITY: &str = "0.3";
pub const ENABLED_OPACITY: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "prev" => Some(Direction::Prev),
            "next" => Some(Direction::Next),
            _ => None,
        }
    }
}

/// Layout measurements of the scrolling `.gallery.carousel` element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub client_width: f64,
    pub scroll_width: f64,
    pub scroll_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl NavState {
    pub fn prev_opacity(&self) -> &'static str {
        opacity(self.prev_disabled)
    }

    pub fn next_opacity(&self) -> &'static str {
        opacity(self.next_disabled)
    }
}

fn opacity(disabled: bool) -> &'static str {
    if disabled {
        DISABLED_OPACITY
    } else {
        ENABLED_OPACITY
    }
}

#[derive(Debug, Default)]
pub struct Carousel {
    metrics: ScrollMetrics,
}

impl Carousel {
    /// Checks a rendered carousel gallery for its scroller and both buttons.
    pub fn from_html(html: &str) -> Option<Self> {
        let document = dom::parse_html_document(html);
        let mut containers = Vec::new();
        dom::collect_elements(
            &document.document,
            &|handle: &Handle| {
                dom::has_class(handle, "gallery-box") && dom::has_class(handle, "carousel-container")
            },
            &mut containers,
        );
        let container = containers.first()?;

        let find = |first: &'static str, second: &'static str| {
            let mut found = Vec::new();
            dom::collect_elements(
                container,
                &|handle: &Handle| dom::has_class(handle, first) && dom::has_class(handle, second),
                &mut found,
            );
            !found.is_empty()
        };
        let gallery = find("gallery", "carousel");
        let prev = find("carousel-nav", "prev");
        let next = find("carousel-nav", "next");
        if !(gallery && prev && next) {
            log::debug!("missing carousel elements: gallery={gallery} prev={prev} next={next}");
            return None;
        }
        Some(Self::default())
    }

    pub fn update(&mut self, metrics: ScrollMetrics) -> NavState {
        self.metrics = metrics;
        self.nav_state()
    }

    pub fn scroll_amount(&self) -> f64 {
        self.metrics.client_width * SCROLL_FRACTION
    }

    /// Applies a nav click and returns the requested scroll delta.
    pub fn scroll(&mut self, direction: Direction) -> f64 {
        let delta = match direction {
            Direction::Prev => -self.scroll_amount(),
            Direction::Next => self.scroll_amount(),
        };
        let max = self.max_scroll();
        self.metrics.scroll_left = (self.metrics.scroll_left + delta).clamp(0.0, max);
        delta
    }

    pub fn nav_state(&self) -> NavState {
        NavState {
            prev_disabled: self.metrics.scroll_left <= EDGE_THRESHOLD,
            next_disabled: self.metrics.scroll_left >= self.max_scroll() - EDGE_THRESHOLD,
        }
    }

    fn max_scroll(&self) -> f64 {
        (self.metrics.scroll_width - self.metrics.client_width).max(0.0)
    }
}
