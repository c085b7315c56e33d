//! Server-side animation classification and the animated block wrapper

use crate::html::{class_list, escape_attr};

pub const ENTRANCE_ANIMATIONS: [&str; 13] = [
    "fadeIn",
    "fadeInUp",
    "fadeInDown",
    "fadeInLeft",
    "fadeInRight",
    "slideInUp",
    "slideInDown",
    "slideInLeft",
    "slideInRight",
    "scaleIn",
    "zoomIn",
    "rotateIn",
    "bounceIn",
];

pub const CONTINUOUS_ANIMATIONS: [&str; 3] = ["pulse", "wobble", "shake"];

pub const ANIMATE_CLASS: &str = "block-animate";
pub const ANIMATED_CLASS: &str = "block-animated";
pub const ENTRANCE_CLASS: &str = "entrance-animation";
pub const CONTINUOUS_CLASS: &str = "continuous-animation";
pub const INFINITE: &str = "infinite";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCategory {
    Entrance,
    Continuous,
    Other,
}

impl AnimationCategory {
    pub fn classify(kind: &str) -> Self {
        if ENTRANCE_ANIMATIONS.contains(&kind) {
            AnimationCategory::Entrance
        } else if CONTINUOUS_ANIMATIONS.contains(&kind) {
            AnimationCategory::Continuous
        } else {
            AnimationCategory::Other
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "entrance" => AnimationCategory::Entrance,
            "continuous" => AnimationCategory::Continuous,
            _ => AnimationCategory::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationCategory::Entrance => "entrance",
            AnimationCategory::Continuous => "continuous",
            AnimationCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationTrigger {
    OnLoad,
    #[default]
    OnVisible,
    OnScroll,
    OnHover,
    OnClick,
}

impl AnimationTrigger {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "onLoad" => Some(AnimationTrigger::OnLoad),
            "onVisible" => Some(AnimationTrigger::OnVisible),
            "onScroll" => Some(AnimationTrigger::OnScroll),
            "onHover" => Some(AnimationTrigger::OnHover),
            "onClick" => Some(AnimationTrigger::OnClick),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationTrigger::OnLoad => "onLoad",
            AnimationTrigger::OnVisible => "onVisible",
            AnimationTrigger::OnScroll => "onScroll",
            AnimationTrigger::OnHover => "onHover",
            AnimationTrigger::OnClick => "onClick",
        }
    }

    pub fn is_visibility(self) -> bool {
        matches!(self, AnimationTrigger::OnVisible | AnimationTrigger::OnScroll)
    }

    pub fn is_interactive(self) -> bool {
        matches!(self, AnimationTrigger::OnHover | AnimationTrigger::OnClick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Forwards,
    None,
    Both,
}

impl FillMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FillMode::Forwards => "forwards",
            FillMode::None => "none",
            FillMode::Both => "both",
        }
    }
}

pub fn fill_mode(category: AnimationCategory, iterations: &str) -> FillMode {
    match category {
        AnimationCategory::Entrance if iterations != INFINITE => FillMode::Forwards,
        AnimationCategory::Continuous => FillMode::None,
        _ => FillMode::Both,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub kind: String,
    pub duration_secs: f64,
    pub delay_secs: f64,
    pub direction: String,
    pub easing: String,
    pub iterations: String,
    pub trigger: AnimationTrigger,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            kind: "none".to_string(),
            duration_secs: 1.0,
            delay_secs: 0.0,
            direction: "normal".to_string(),
            easing: "ease-in-out".to_string(),
            iterations: "1".to_string(),
            trigger: AnimationTrigger::OnVisible,
        }
    }
}

impl AnimationSpec {
    pub fn is_none(&self) -> bool {
        self.kind.is_empty() || self.kind == "none"
    }

    pub fn is_infinite(&self) -> bool {
        self.iterations == INFINITE
    }

    pub fn category(&self) -> AnimationCategory {
        AnimationCategory::classify(&self.kind)
    }

    pub fn fill_mode(&self) -> FillMode {
        fill_mode(self.category(), &self.iterations)
    }

    pub fn data_attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("data-animation-type", self.kind.clone()),
            ("data-animation-trigger", self.trigger.as_str().to_string()),
            ("data-animation-duration", format_number(self.duration_secs)),
            ("data-animation-delay", format_number(self.delay_secs)),
            ("data-animation-easing", self.easing.clone()),
            ("data-animation-iterations", self.iterations.clone()),
            ("data-animation-direction", self.direction.clone()),
            (
                "data-animation-category",
                self.category().as_str().to_string(),
            ),
        ]
    }

    /// The `animation-*` declarations applied inline for load-triggered blocks.
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        vec![
            ("animation-name", self.kind.clone()),
            (
                "animation-duration",
                format!("{}s", format_number(self.duration_secs)),
            ),
            (
                "animation-delay",
                format!("{}s", format_number(self.delay_secs)),
            ),
            ("animation-direction", self.direction.clone()),
            ("animation-timing-function", self.easing.clone()),
            ("animation-iteration-count", self.iterations.clone()),
            ("animation-fill-mode", self.fill_mode().as_str().to_string()),
        ]
    }
}

/// Formats seconds the way they appear in data attributes: `1`, `0.5`, `1.25`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Wraps rendered block markup in the animation-capable container.
pub fn wrap_block(spec: &AnimationSpec, css: &str, id: &str, inner: &str) -> String {
    if spec.is_none() {
        return format!(
            "<div id=\"{}\"{}>{}</div>",
            escape_attr(id),
            style_attr(css),
            inner
        );
    }

    let category = spec.category();
    let trigger_class = format!("animate-{}", spec.trigger.as_str().to_lowercase());
    let classes = class_list([
        ANIMATE_CLASS,
        trigger_class.as_str(),
        match category {
            AnimationCategory::Entrance => ENTRANCE_CLASS,
            _ => "",
        },
        match category {
            AnimationCategory::Continuous => CONTINUOUS_CLASS,
            _ => "",
        },
    ]);

    let mut declarations: Vec<String> = Vec::new();
    if !css.is_empty() {
        declarations.push(css.trim_end_matches(';').to_string());
    }
    if spec.trigger == AnimationTrigger::OnLoad {
        for (property, value) in spec.declarations() {
            declarations.push(format!("{property}: {value}"));
        }
    } else if category == AnimationCategory::Entrance && spec.trigger.is_visibility() {
        declarations.push("opacity: 0".to_string());
    } else {
        declarations.push("opacity: 1".to_string());
    }

    let mut out = format!(
        "<div id=\"{}\" class=\"{}\"{}",
        escape_attr(id),
        classes,
        style_attr(&declarations.join("; "))
    );
    for (name, value) in spec.data_attributes() {
        out.push_str(&format!(" {name}=\"{}\"", escape_attr(&value)));
    }
    out.push('>');
    out.push_str(inner);
    out.push_str("</div>");
    out
}

fn style_attr(css: &str) -> String {
    if css.trim().is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape_attr(css))
    }
}

pub const ANIMATION_STYLESHEET: &str = r#"
@keyframes fadeIn {
  from { opacity: 0; }
  to { opacity: 1; }
}

@keyframes fadeInUp {
  from { opacity: 0; transform: translateY(50px); }
  to { opacity: 1; transform: translateY(0); }
}

@keyframes fadeInDown {
  from { opacity: 0; transform: translateY(-50px); }
  to { opacity: 1; transform: translateY(0); }
}

@keyframes fadeInLeft {
  from { opacity: 0; transform: translateX(-50px); }
  to { opacity: 1; transform: translateX(0); }
}

@keyframes fadeInRight {
  from { opacity: 0; transform: translateX(50px); }
  to { opacity: 1; transform: translateX(0); }
}

@keyframes slideInUp {
  from { transform: translateY(100px); opacity: 0; }
  to { transform: translateY(0); opacity: 1; }
}

@keyframes slideInDown {
  from { transform: translateY(-100px); opacity: 0; }
  to { transform: translateY(0); opacity: 1; }
}

@keyframes slideInLeft {
  from { transform: translateX(-100px); opacity: 0; }
  to { transform: translateX(0); opacity: 1; }
}

@keyframes slideInRight {
  from { transform: translateX(100px); opacity: 0; }
  to { transform: translateX(0); opacity: 1; }
}

@keyframes scaleIn {
  from { transform: scale(0); opacity: 0; }
  to { transform: scale(1); opacity: 1; }
}

@keyframes zoomIn {
  from { transform: scale(0.8); opacity: 0; }
  to { transform: scale(1); opacity: 1; }
}

@keyframes rotateIn {
  from { transform: rotate(-180deg); opacity: 0; }
  to { transform: rotate(0deg); opacity: 1; }
}

@keyframes bounceIn {
  0% { transform: scale(0.3); opacity: 0; }
  50% { transform: scale(1.05); }
  70% { transform: scale(0.9); }
  100% { transform: scale(1); opacity: 1; }
}

/* interactive variants keep opacity */
@keyframes scaleUp {
  from { transform: scale(1); }
  to { transform: scale(1.1); }
}

@keyframes zoomUp {
  from { transform: scale(1); }
  to { transform: scale(1.05); }
}

@keyframes rotateLeft {
  from { transform: rotate(0deg); }
  to { transform: rotate(-5deg); }
}

@keyframes rotateRight {
  from { transform: rotate(0deg); }
  to { transform: rotate(5deg); }
}

@keyframes pulse {
  0%, 100% { transform: scale(1); }
  50% { transform: scale(1.05); }
}

@keyframes wobble {
  0% { transform: rotate(0deg); }
  15% { transform: rotate(-5deg); }
  30% { transform: rotate(5deg); }
  45% { transform: rotate(-3deg); }
  60% { transform: rotate(3deg); }
  75% { transform: rotate(-1deg); }
  100% { transform: rotate(0deg); }
}

@keyframes shake {
  0%, 100% { transform: translateX(0); }
  10%, 30%, 50%, 70%, 90% { transform: translateX(-10px); }
  20%, 40%, 60%, 80% { transform: translateX(10px); }
}

.block-animate {
  opacity: 1;
}

.block-animate.entrance-animation.animate-onvisible:not(.block-animated),
.block-animate.entrance-animation.animate-onscroll:not(.block-animated) {
  opacity: 0;
}

.block-animate.continuous-animation {
  opacity: 1;
}

.block-animate.block-animated.entrance-animation {
  opacity: 1 !important;
}
"#;

pub const STYLESHEET_ID: &str = "tessera-animation-styles";

/// `<style>` element carrying [`ANIMATION_STYLESHEET`], for the page head.
pub fn stylesheet_tag() -> String {
    format!("<style id=\"{STYLESHEET_ID}\">{ANIMATION_STYLESHEET}</style>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str, trigger: AnimationTrigger) -> AnimationSpec {
        AnimationSpec {
            kind: kind.to_string(),
            trigger,
            ..AnimationSpec::default()
        }
    }

    #[test]
    fn classification_covers_all_lists() {
        for kind in ENTRANCE_ANIMATIONS {
            assert_eq!(AnimationCategory::classify(kind), AnimationCategory::Entrance);
        }
        for kind in CONTINUOUS_ANIMATIONS {
            assert_eq!(
                AnimationCategory::classify(kind),
                AnimationCategory::Continuous
            );
        }
        assert_eq!(AnimationCategory::classify("spin"), AnimationCategory::Other);
    }

    #[test]
    fn fill_mode_follows_category() {
        assert_eq!(fill_mode(AnimationCategory::Entrance, "1"), FillMode::Forwards);
        assert_eq!(fill_mode(AnimationCategory::Entrance, "infinite"), FillMode::Both);
        assert_eq!(fill_mode(AnimationCategory::Continuous, "1"), FillMode::None);
        assert_eq!(fill_mode(AnimationCategory::Other, "3"), FillMode::Both);
    }

    #[test]
    fn no_animation_is_plain_container() {
        let html = wrap_block(&AnimationSpec::default(), "color: red", "b1", "<p>x</p>");
        assert_eq!(html, "<div id=\"b1\" style=\"color: red\"><p>x</p></div>");
        let bare = wrap_block(&AnimationSpec::default(), "", "b1", "x");
        assert_eq!(bare, "<div id=\"b1\">x</div>");
    }

    #[test]
    fn visible_entrance_starts_hidden() {
        let html = wrap_block(&spec("fadeIn", AnimationTrigger::OnVisible), "", "b", "x");
        assert!(html.contains(
            "class=\"block-animate animate-onvisible entrance-animation\""
        ));
        assert!(html.contains("style=\"opacity: 0\""));
        assert!(html.contains("data-animation-category=\"entrance\""));
        assert!(html.contains("data-animation-duration=\"1\""));
    }

    #[test]
    fn hover_entrance_starts_visible() {
        let html = wrap_block(&spec("zoomIn", AnimationTrigger::OnHover), "", "b", "x");
        assert!(html.contains("animate-onhover"));
        assert!(html.contains("style=\"opacity: 1\""));
    }

    #[test]
    fn load_trigger_applies_animation_inline() {
        let mut load = spec("pulse", AnimationTrigger::OnLoad);
        load.duration_secs = 1.5;
        let html = wrap_block(&load, "margin: 0", "b", "x");
        assert!(html.contains("continuous-animation"));
        assert!(html.contains(
            "style=\"margin: 0; animation-name: pulse; animation-duration: 1.5s; animation-delay: 0s; animation-direction: normal; animation-timing-function: ease-in-out; animation-iteration-count: 1; animation-fill-mode: none\""
        ));
    }

    #[test]
    fn trigger_round_trips_through_strings() {
        for trigger in [
            AnimationTrigger::OnLoad,
            AnimationTrigger::OnVisible,
            AnimationTrigger::OnScroll,
            AnimationTrigger::OnHover,
            AnimationTrigger::OnClick,
        ] {
            assert_eq!(AnimationTrigger::parse(trigger.as_str()), Some(trigger));
        }
        assert_eq!(AnimationTrigger::parse("onWhatever"), None);
    }

    #[test]
    fn stylesheet_tag_is_identified() {
        let tag = stylesheet_tag();
        assert!(tag.starts_with("<style id=\"tessera-animation-styles\">"));
        assert!(tag.contains("@keyframes fadeInUp"));
        assert!(tag.ends_with("</style>"));
    }
}
