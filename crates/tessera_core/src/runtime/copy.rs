use markup5ever_rcdom::Handle;

use crate::dom;
use crate::error::ClipboardError;

pub const COPY_RESET_MS: u64 = 2000;
pub const IDLE_TITLE: &str = "Copy code";
pub const COPIED_TITLE: &str = "Copied!";

/// System clipboard with a manual-selection fallback.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn select_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

impl CopyState {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyState::Idle => "idle",
            CopyState::Copied => "copied",
        }
    }
}

/// The copy button of one code block.
#[derive(Debug, Default)]
pub struct CopyButton {
    state: CopyState,
}

impl CopyButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    pub fn title(&self) -> &'static str {
        match self.state {
            CopyState::Idle => IDLE_TITLE,
            CopyState::Copied => COPIED_TITLE,
        }
    }

    /// Copies `text`. On success returns the delay after which
    /// [`CopyButton::reset`] should run.
    pub fn click<C: Clipboard + ?Sized>(&mut self, clipboard: &mut C, text: &str) -> Option<u64> {
        match clipboard.write_text(text) {
            Ok(()) => {
                self.state = CopyState::Copied;
                Some(COPY_RESET_MS)
            }
            Err(err) => {
                log::error!("failed to copy code: {err}");
                if let Err(err) = clipboard.select_text(text) {
                    log::error!("failed to select code for manual copying: {err}");
                }
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = CopyState::Idle;
    }
}

/// Text a rendered code block copies: the `line-content` of every
/// `code-line` joined with newlines, or the whole `<code>` text.
pub fn extract_code_text(html: &str) -> Option<String> {
    let document = dom::parse_html_document(html);
    let code = dom::find_element(&document.document, "code")?;

    let mut lines = Vec::new();
    dom::collect_elements(
        &code,
        &|handle: &Handle| dom::has_class(handle, "code-line"),
        &mut lines,
    );
    if lines.is_empty() {
        return Some(dom::text_content(&code));
    }

    let text = lines
        .iter()
        .map(|line| {
            let mut content = Vec::new();
            dom::collect_elements(
                line,
                &|handle: &Handle| dom::has_class(handle, "line-content"),
                &mut content,
            );
            content.first().map(dom::text_content).unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\n");
    Some(text)
}
