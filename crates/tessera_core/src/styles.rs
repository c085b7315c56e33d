//! Parsing of per-block `data-styles` declaration lists

use crate::animation::{AnimationSpec, AnimationTrigger};

const ANIMATION_PREFIX: &str = "--animation-";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleBag {
    /// Regular declarations in source order, property names in camelCase.
    pub properties: Vec<(String, String)>,
    pub animation: AnimationSpec,
}

impl StyleBag {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Serializes the regular declarations back to an inline `style` value.
    pub fn to_inline_css(&self) -> String {
        self.properties
            .iter()
            .map(|(name, value)| format!("{}: {value}", kebab_case(name)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn parse_styles(styles: Option<&str>, defaults: &AnimationSpec) -> StyleBag {
    let mut bag = StyleBag {
        properties: Vec::new(),
        animation: defaults.clone(),
    };
    let Some(styles) = styles else {
        return bag;
    };

    for declaration in styles.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(key) = property.strip_prefix(ANIMATION_PREFIX) {
            apply_animation_property(&mut bag.animation, key, value);
        } else if property.starts_with("--") {
            bag.properties
                .push((property.to_string(), value.to_string()));
        } else {
            bag.properties
                .push((camel_case(&property.to_lowercase()), value.to_string()));
        }
    }
    bag
}

fn apply_animation_property(spec: &mut AnimationSpec, key: &str, value: &str) {
    match key {
        "type" => spec.kind = value.to_string(),
        "duration" => match parse_seconds(value) {
            Some(seconds) => spec.duration_secs = seconds,
            None => log::warn!("ignoring invalid animation duration '{value}'"),
        },
        "delay" => match parse_seconds(value) {
            Some(seconds) => spec.delay_secs = seconds,
            None => log::warn!("ignoring invalid animation delay '{value}'"),
        },
        "direction" => spec.direction = value.to_string(),
        "easing" => spec.easing = value.to_string(),
        "iterations" => spec.iterations = value.to_string(),
        "trigger" => match AnimationTrigger::parse(value) {
            Some(trigger) => spec.trigger = trigger,
            None => log::warn!("ignoring unknown animation trigger '{value}'"),
        },
        other => log::debug!("ignoring unknown animation property '{other}'"),
    }
}

/// Accepts `1.5`, `1.5s` and `500ms`.
pub fn parse_seconds(value: &str) -> Option<f64> {
    let value = value.trim();
    let seconds = if let Some(millis) = value.strip_suffix("ms") {
        millis.trim().parse::<f64>().ok()? / 1000.0
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<f64>().ok()?
    } else {
        value.parse::<f64>().ok()?
    };
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// `background-color` -> `backgroundColor`, `-webkit-transition` -> `WebkitTransition`.
pub fn camel_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper_next = false;
    for ch in property.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn kebab_case(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_properties_become_camel_case() {
        let bag = parse_styles(
            Some("background-color: #fff; margin:0 auto;;  border-top-left-radius : 4px"),
            &AnimationSpec::default(),
        );
        assert_eq!(
            bag.properties,
            vec![
                ("backgroundColor".to_string(), "#fff".to_string()),
                ("margin".to_string(), "0 auto".to_string()),
                ("borderTopLeftRadius".to_string(), "4px".to_string()),
            ]
        );
        assert_eq!(
            bag.to_inline_css(),
            "background-color: #fff; margin: 0 auto; border-top-left-radius: 4px"
        );
    }

    #[test]
    fn value_is_split_at_first_colon() {
        let bag = parse_styles(
            Some("background-image: url(https://example.com/a.png)"),
            &AnimationSpec::default(),
        );
        assert_eq!(
            bag.get("backgroundImage"),
            Some("url(https://example.com/a.png)")
        );
    }

    #[test]
    fn animation_properties_are_extracted() {
        let bag = parse_styles(
            Some(
                "--animation-type: fadeInUp; --animation-duration: 500ms; --animation-delay: 0.2s; --animation-trigger: onClick; --animation-iterations: infinite; color: red",
            ),
            &AnimationSpec::default(),
        );
        assert_eq!(bag.animation.kind, "fadeInUp");
        assert_eq!(bag.animation.duration_secs, 0.5);
        assert_eq!(bag.animation.delay_secs, 0.2);
        assert_eq!(bag.animation.trigger, AnimationTrigger::OnClick);
        assert!(bag.animation.is_infinite());
        assert_eq!(bag.properties.len(), 1);
    }

    #[test]
    fn custom_properties_are_verbatim() {
        let bag = parse_styles(Some("--Accent-Color: blue"), &AnimationSpec::default());
        assert_eq!(bag.get("--Accent-Color"), Some("blue"));
        assert_eq!(bag.to_inline_css(), "--Accent-Color: blue");
    }

    #[test]
    fn invalid_animation_values_keep_defaults() {
        let bag = parse_styles(
            Some("--animation-duration: fast; --animation-trigger: sometimes"),
            &AnimationSpec::default(),
        );
        assert_eq!(bag.animation, AnimationSpec::default());
    }

    #[test]
    fn vendor_prefix_round_trips() {
        assert_eq!(camel_case("-webkit-transition"), "WebkitTransition");
        assert_eq!(kebab_case("WebkitTransition"), "-webkit-transition");
    }

    #[test]
    fn seconds_parsing() {
        assert_eq!(parse_seconds("1"), Some(1.0));
        assert_eq!(parse_seconds("1.5s"), Some(1.5));
        assert_eq!(parse_seconds("250ms"), Some(0.25));
        assert_eq!(parse_seconds("-1"), None);
        assert_eq!(parse_seconds("abc"), None);
    }
}
