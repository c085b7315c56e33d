use markup5ever_rcdom::Handle;

use crate::dom;

/// Open/closed state of one rendered accordion block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionModel {
    allow_multiple: bool,
    active: Vec<bool>,
}

impl AccordionModel {
    pub fn new(allow_multiple: bool, items: usize) -> Self {
        Self {
            allow_multiple,
            active: vec![false; items],
        }
    }

    /// Reads the first `data-slot="accordion"` block in `html`.
    pub fn from_html(html: &str) -> Option<Self> {
        let document = dom::parse_html_document(html);
        let mut roots = Vec::new();
        dom::collect_elements(
            &document.document,
            &|handle: &Handle| dom::attr(handle, "data-slot").as_deref() == Some("accordion"),
            &mut roots,
        );
        let root = roots.first()?;

        let mut settings = Vec::new();
        dom::collect_elements(
            root,
            &|handle: &Handle| dom::has_attr(handle, "data-allow-multiple"),
            &mut settings,
        );
        let allow_multiple = dom::attr(root, "data-allow-multiple")
            .or_else(|| {
                settings
                    .first()
                    .and_then(|handle| dom::attr(handle, "data-allow-multiple"))
            })
            .is_some_and(|value| value == "true");

        let mut items = Vec::new();
        dom::collect_elements(
            root,
            &|handle: &Handle| {
                dom::attr(handle, "data-slot").as_deref() == Some("accordion-item")
            },
            &mut items,
        );
        Some(Self {
            allow_multiple,
            active: items
                .iter()
                .map(|item| dom::has_class(item, "active"))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Trigger click. Without `allow_multiple` every other item closes first.
    pub fn toggle(&mut self, index: usize) {
        let Some(current) = self.active.get(index).copied() else {
            return;
        };
        if !self.allow_multiple {
            for (other, active) in self.active.iter_mut().enumerate() {
                if other != index {
                    *active = false;
                }
            }
        }
        self.active[index] = !current;
    }

    /// Enter and Space activate the trigger. Returns true when handled.
    pub fn handle_key(&mut self, index: usize, key: &str) -> bool {
        match key {
            "Enter" | " " => {
                self.toggle(index);
                true
            }
            _ => false,
        }
    }

    pub fn aria_expanded(&self, index: usize) -> &'static str {
        if self.is_active(index) { "true" } else { "false" }
    }

    pub fn title_class(&self, index: usize) -> &'static str {
        if self.is_active(index) {
            "font-bold"
        } else {
            "font-medium"
        }
    }
}
