//! Client-side animation state machine.
//!
//! A block wrapper produced by [`crate::animation::wrap_block`] carries its
//! animation as `data-animation-*` attributes. The host page feeds DOM events
//! into [`AnimationRuntime`], which mutates the element through
//! [`AnimationTarget`]. Deferred work is requested with
//! [`AnimationTarget::schedule`] and delivered back via
//! [`AnimationRuntime::handle_timer`].

use crate::animation::{
    ANIMATED_CLASS, AnimationCategory, AnimationTrigger, INFINITE, fill_mode,
};

pub const STATE_KEY: &str = "animation-state";
pub const TYPE_KEY: &str = "animation-type";
pub const TRIGGER_KEY: &str = "animation-trigger";
pub const DURATION_KEY: &str = "animation-duration";
pub const DELAY_KEY: &str = "animation-delay";
pub const EASING_KEY: &str = "animation-easing";
pub const ITERATIONS_KEY: &str = "animation-iterations";
pub const DIRECTION_KEY: &str = "animation-direction";
pub const CATEGORY_KEY: &str = "animation-category";

/// Extra wait before a click-triggered animation resets.
pub const CLICK_RESET_BUFFER_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running,
    Complete,
}

impl AnimationState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "idle" => Some(AnimationState::Idle),
            "running" => Some(AnimationState::Running),
            "complete" => Some(AnimationState::Complete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Running => "running",
            AnimationState::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationTimer {
    Complete,
    Reset,
}

/// The slice of an element the animation runtime needs.
///
/// Data keys are dataset keys without the `data-` prefix
/// (`animation-state`, `animation-type`, ...).
pub trait AnimationTarget {
    fn data(&self, key: &str) -> Option<String>;
    fn set_data(&mut self, key: &str, value: &str);
    fn set_style(&mut self, property: &str, value: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn observe_visibility(&mut self);
    fn unobserve_visibility(&mut self);
    fn schedule(&mut self, timer: AnimationTimer, delay_ms: u64);
}

fn state<T: AnimationTarget + ?Sized>(target: &T) -> Option<AnimationState> {
    target
        .data(STATE_KEY)
        .and_then(|value| AnimationState::parse(&value))
}

fn set_state<T: AnimationTarget + ?Sized>(target: &mut T, state: AnimationState) {
    target.set_data(STATE_KEY, state.as_str());
}

fn is_running<T: AnimationTarget + ?Sized>(target: &T) -> bool {
    state(target) == Some(AnimationState::Running)
}

fn trigger_of<T: AnimationTarget + ?Sized>(target: &T) -> Option<AnimationTrigger> {
    target
        .data(TRIGGER_KEY)
        .and_then(|value| AnimationTrigger::parse(&value))
}

fn category_of<T: AnimationTarget + ?Sized>(target: &T) -> AnimationCategory {
    target
        .data(CATEGORY_KEY)
        .map(|value| AnimationCategory::parse(&value))
        .unwrap_or(AnimationCategory::Other)
}

fn text_or<T: AnimationTarget + ?Sized>(target: &T, key: &str, default: &str) -> String {
    target
        .data(key)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn seconds<T: AnimationTarget + ?Sized>(target: &T, key: &str, default: f64) -> f64 {
    target
        .data(key)
        .and_then(|value| value.trim().trim_end_matches('s').parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

fn millis(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

fn is_infinite<T: AnimationTarget + ?Sized>(target: &T) -> bool {
    text_or(target, ITERATIONS_KEY, "1") == INFINITE
}

/// Drives every animated block on a page.
///
/// The only state kept here is the rotation counter that alternates
/// `rotateLeft` and `rotateRight` for interactive `rotateIn` blocks.
#[derive(Debug, Default)]
pub struct AnimationRuntime {
    rotations: usize,
}

impl AnimationRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a freshly discovered block into `idle` and wires its trigger.
    pub fn init_animation<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        set_state(target, AnimationState::Idle);
        match trigger_of(target) {
            Some(AnimationTrigger::OnVisible | AnimationTrigger::OnScroll) => {
                target.observe_visibility();
            }
            Some(AnimationTrigger::OnClick) => target.set_style("cursor", "pointer"),
            Some(AnimationTrigger::OnLoad | AnimationTrigger::OnHover) => {}
            None => log::debug!("animated block without a known trigger"),
        }
    }

    /// Intersection notification. Fires once, then stops observing.
    pub fn handle_visibility<T: AnimationTarget + ?Sized>(
        &mut self,
        target: &mut T,
        intersecting: bool,
    ) {
        let visibility = trigger_of(target).is_some_and(AnimationTrigger::is_visibility);
        if !visibility || !intersecting {
            return;
        }
        self.trigger(target);
        target.unobserve_visibility();
    }

    pub fn handle_pointer_enter<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        if trigger_of(target) != Some(AnimationTrigger::OnHover) || is_running(target) {
            return;
        }
        self.trigger(target);
    }

    pub fn handle_pointer_leave<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        if trigger_of(target) != Some(AnimationTrigger::OnHover) {
            return;
        }
        if is_infinite(target) || is_running(target) {
            return;
        }
        self.reset(target);
    }

    pub fn handle_click<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        if trigger_of(target) != Some(AnimationTrigger::OnClick) || is_running(target) {
            return;
        }
        self.trigger(target);
        if !is_infinite(target) {
            let total = seconds(target, DURATION_KEY, 1.0) + seconds(target, DELAY_KEY, 0.0);
            target.schedule(
                AnimationTimer::Reset,
                millis(total) + CLICK_RESET_BUFFER_MS,
            );
        }
    }

    pub fn handle_timer<T: AnimationTarget + ?Sized>(&mut self, target: &mut T, timer: AnimationTimer) {
        match timer {
            AnimationTimer::Complete => self.complete(target),
            AnimationTimer::Reset => self.reset(target),
        }
    }

    /// Starts the animation: `idle`/`complete` -> `running`.
    pub fn trigger<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        if target.has_class(ANIMATED_CLASS) && is_running(target) {
            return;
        }
        let kind = text_or(target, TYPE_KEY, "none");
        if kind == "none" {
            return;
        }
        let trigger = trigger_of(target);
        let category = category_of(target);
        let iterations = text_or(target, ITERATIONS_KEY, "1");
        let duration = text_or(target, DURATION_KEY, "1");
        let delay = text_or(target, DELAY_KEY, "0");

        set_state(target, AnimationState::Running);
        target.set_style("animation-name", "none");

        match category {
            AnimationCategory::Entrance => {
                if let Some(opacity) = initial_opacity(&kind, trigger) {
                    target.set_style("opacity", opacity);
                }
            }
            AnimationCategory::Continuous => target.set_style("opacity", "1"),
            AnimationCategory::Other => {}
        }

        let name = match trigger {
            Some(trigger) if trigger.is_interactive() => self.interactive_variant(&kind),
            _ => kind.clone(),
        };
        target.set_style("animation-name", &name);
        target.set_style("animation-duration", &format!("{duration}s"));
        target.set_style("animation-delay", &format!("{delay}s"));
        target.set_style(
            "animation-timing-function",
            &text_or(target, EASING_KEY, "ease-in-out"),
        );
        target.set_style("animation-iteration-count", &iterations);
        target.set_style(
            "animation-direction",
            &text_or(target, DIRECTION_KEY, "normal"),
        );
        target.set_style(
            "animation-fill-mode",
            fill_mode(category, &iterations).as_str(),
        );
        target.add_class(ANIMATED_CLASS);

        if iterations != INFINITE {
            let total = seconds(target, DURATION_KEY, 1.0) + seconds(target, DELAY_KEY, 0.0);
            target.schedule(AnimationTimer::Complete, millis(total));
        }
    }

    /// `running` -> `complete`. Finite entrance animations are pinned visible.
    pub fn complete<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        set_state(target, AnimationState::Complete);
        if category_of(target) == AnimationCategory::Entrance && !is_infinite(target) {
            target.set_style("opacity", "1");
            target.set_style("transform", "initial");
        }
    }

    /// Back to `idle`. Infinite animations are never reset.
    pub fn reset<T: AnimationTarget + ?Sized>(&mut self, target: &mut T) {
        if is_infinite(target) {
            return;
        }
        set_state(target, AnimationState::Idle);
        target.set_style("animation-name", "none");
        target.remove_class(ANIMATED_CLASS);
        if matches!(
            category_of(target),
            AnimationCategory::Entrance | AnimationCategory::Continuous
        ) {
            target.set_style("opacity", "1");
        }
    }

    fn interactive_variant(&mut self, kind: &str) -> String {
        match kind {
            "scaleIn" => "scaleUp".to_string(),
            "zoomIn" => "zoomUp".to_string(),
            "rotateIn" => {
                self.rotations += 1;
                if self.rotations % 2 == 1 {
                    "rotateLeft".to_string()
                } else {
                    "rotateRight".to_string()
                }
            }
            other => other.to_string(),
        }
    }
}

/// Opacity an entrance animation starts from, if the trigger sets one.
fn initial_opacity(kind: &str, trigger: Option<AnimationTrigger>) -> Option<&'static str> {
    let has = |needle: &str| kind.contains(needle);
    match trigger {
        Some(trigger) if trigger.is_visibility() => {
            let hidden = ["fade", "scale", "zoom", "bounce", "rotate"]
                .iter()
                .any(|needle| has(needle));
            hidden.then_some("0")
        }
        Some(trigger) if trigger.is_interactive() => {
            if has("fade") && !has("scale") && !has("zoom") && !has("rotate") {
                Some("0")
            } else {
                Some("1")
            }
        }
        _ => Some("1"),
    }
}
