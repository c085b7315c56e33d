//! Gallery lightbox: one overlay per page, shared by every gallery.

use markup5ever_rcdom::Handle;

use crate::dom;

pub const LIGHTBOX_ID: &str = "gallery-lightbox";

/// Minimum natural size (exclusive) for content images to become zoomable.
pub const ZOOM_MIN_DIMENSION: u32 = 500;

/// Markup for the overlay, appended to `<body>` the first time it is needed.
pub const LIGHTBOX_MARKUP: &str = concat!(
    "<div id=\"gallery-lightbox\" class=\"gallery-lightbox hidden\" style=\"z-index: 9999\">",
    "<div class=\"gallery-lightbox-content\">",
    "<button class=\"gallery-lightbox-close\">&#x2715;</button>",
    "<img class=\"gallery-lightbox-image\" src=\"\" alt=\"\">",
    "<div class=\"gallery-lightbox-caption\">",
    "<h3 class=\"gallery-lightbox-title\"></h3>",
    "<p class=\"gallery-lightbox-caption-text\"></p>",
    "</div>",
    "<button class=\"gallery-lightbox-prev\">&#x25C0;</button>",
    "<button class=\"gallery-lightbox-next\">&#x25B6;</button>",
    "</div></div>"
);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LightboxImage {
    pub url: String,
    pub alt: String,
    pub caption: String,
}

/// What the overlay currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightboxView {
    pub image_url: String,
    pub image_alt: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub caption_visible: bool,
    pub nav_visible: bool,
}

#[derive(Debug, Default)]
pub struct Lightbox {
    images: Vec<LightboxImage>,
    index: usize,
    open: bool,
}

impl Lightbox {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Opens on `index` of `images`. Out-of-range indexes leave the overlay unchanged.
    pub fn show(&mut self, images: Vec<LightboxImage>, index: usize) -> bool {
        if index >= images.len() {
            return false;
        }
        self.images = images;
        self.index = index;
        self.open = true;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn next(&mut self) {
        if self.images.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.images.len();
    }

    pub fn prev(&mut self) {
        if self.images.is_empty() {
            return;
        }
        self.index = (self.index + self.images.len() - 1) % self.images.len();
    }

    /// Keyboard handling while open. Returns true when the key was consumed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.open {
            return false;
        }
        match key {
            "Escape" => self.close(),
            "ArrowRight" => self.next(),
            "ArrowLeft" => self.prev(),
            _ => return false,
        }
        true
    }

    pub fn view(&self) -> Option<LightboxView> {
        if !self.open {
            return None;
        }
        let image = self.images.get(self.index)?;
        let title = Some(image.alt.clone()).filter(|alt| !alt.is_empty());
        let caption = Some(image.caption.clone()).filter(|caption| !caption.is_empty());
        Some(LightboxView {
            image_url: image.url.clone(),
            image_alt: image.alt.clone(),
            caption_visible: title.is_some() || caption.is_some(),
            title,
            caption,
            nav_visible: self.images.len() > 1,
        })
    }
}

/// Owns the page's single lightbox, created on first use.
#[derive(Debug, Default)]
pub struct LightboxHost {
    lightbox: Option<Lightbox>,
}

impl LightboxHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_created(&self) -> bool {
        self.lightbox.is_some()
    }

    /// Returns the overlay, creating it when `zoomable_images > 0`.
    /// Pages without zoomable images never get one.
    pub fn ensure(&mut self, zoomable_images: usize) -> Option<&mut Lightbox> {
        if zoomable_images == 0 && self.lightbox.is_none() {
            return None;
        }
        if self.lightbox.is_none() {
            log::debug!("creating #{LIGHTBOX_ID} overlay");
        }
        Some(self.lightbox.get_or_insert_with(Lightbox::default))
    }

    pub fn lightbox(&mut self) -> Option<&mut Lightbox> {
        self.lightbox.as_mut()
    }
}

/// Zoom eligibility for images inside post content.
pub fn is_zoom_eligible(
    no_zoom_class: bool,
    data_action: Option<&str>,
    natural_width: u32,
    natural_height: u32,
) -> bool {
    !no_zoom_class
        && data_action != Some("none")
        && natural_width > ZOOM_MIN_DIMENSION
        && natural_height > ZOOM_MIN_DIMENSION
}

/// Zoomable images grouped by `.gallery-box`. Zoomable images outside any
/// gallery form a final page-wide group.
pub fn collect_galleries(html: &str) -> Vec<Vec<LightboxImage>> {
    let document = dom::parse_html_document(html);
    let mut boxes = Vec::new();
    dom::collect_elements(
        &document.document,
        &|handle: &Handle| dom::has_class(handle, "gallery-box"),
        &mut boxes,
    );

    let mut groups: Vec<Vec<LightboxImage>> = boxes
        .iter()
        .map(zoomable_images)
        .filter(|images| !images.is_empty())
        .collect();

    let mut loose = Vec::new();
    collect_loose(&document.document, &mut loose);
    if !loose.is_empty() {
        groups.push(loose);
    }
    groups
}

fn is_zoomable(handle: &Handle) -> bool {
    dom::element_name(handle) == Some("img")
        && dom::attr(handle, "data-action").as_deref() == Some("zoom")
}

fn lightbox_image(handle: &Handle) -> LightboxImage {
    let fallback = |name: &str, data: &str| {
        dom::attr(handle, data)
            .or_else(|| dom::attr(handle, name))
            .unwrap_or_default()
    };
    LightboxImage {
        url: fallback("src", "data-gallery-url"),
        alt: fallback("alt", "data-gallery-alt"),
        caption: dom::attr(handle, "data-gallery-caption").unwrap_or_default(),
    }
}

fn zoomable_images(root: &Handle) -> Vec<LightboxImage> {
    let mut found = Vec::new();
    dom::collect_elements(root, &is_zoomable, &mut found);
    found.iter().map(lightbox_image).collect()
}

fn collect_loose(root: &Handle, out: &mut Vec<LightboxImage>) {
    for child in root.children.borrow().iter() {
        if dom::has_class(child, "gallery-box") {
            continue;
        }
        if is_zoomable(child) {
            out.push(lightbox_image(child));
        }
        collect_loose(child, out);
    }
}
