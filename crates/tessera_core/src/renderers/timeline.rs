use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;

use crate::dispatch::BlockProps;
use crate::error::BlockError;
use crate::html::{escape_attr, escape_html_text};
use crate::renderers::Fields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TimelineEvent {
    date: String,
    title: String,
    description: String,
}

const UNKNOWN_PERIOD: &str = "Unknown";
const UNGROUPED_PERIOD: &str = "Events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupBy {
    Year,
    Month,
    None,
}

impl GroupBy {
    fn parse(value: &str) -> Self {
        match value {
            "month" => GroupBy::Month,
            "none" => GroupBy::None,
            _ => GroupBy::Year,
        }
    }
}

pub fn render(props: &BlockProps<'_>) -> Result<String, BlockError> {
    let fields = Fields::from_content(props.content);
    let title = fields.non_empty("title");
    let description = fields.non_empty("description");
    let horizontal = fields.text_or("timelineOrientation", "vertical") == "horizontal";
    let accent = escape_attr(&fields.text_or("accentColor", "#3b82f6"));
    let group_by = GroupBy::parse(&fields.text_or("groupBy", "year"));

    let events: Vec<TimelineEvent> = fields.json_list_or_empty("events");
    if events.is_empty() {
        return Ok("<div class=\"timeline-block timeline-block--empty\"><p>No timeline events to display.</p></div>".to_string());
    }

    let mut out = format!(
        "<div class=\"timeline-block timeline-block--{}\">",
        if horizontal { "horizontal" } else { "vertical" }
    );
    if let Some(title) = &title {
        out.push_str(&format!(
            "<h2 class=\"timeline-block__title\">{}</h2>",
            escape_html_text(title)
        ));
    }
    if let Some(description) = &description {
        out.push_str(&format!(
            "<p class=\"timeline-block__description\">{}</p>",
            escape_html_text(description)
        ));
    }

    if horizontal {
        out.push_str(&format!(
            "<div class=\"timeline-block__scroller\"><div class=\"timeline-block__row\" style=\"min-width: {}px\">",
            events.len() * 300
        ));
        for event in &events {
            out.push_str("<div class=\"timeline-card\">");
            push_event_body(&mut out, event);
            out.push_str("</div>");
        }
        out.push_str("</div></div></div>");
        return Ok(out);
    }

    out.push_str(&format!(
        "<div class=\"timeline-block__track\"><div class=\"timeline-block__line\" style=\"background-color: {accent}\"></div>"
    ));
    for (period, group) in group_events(&events, group_by) {
        out.push_str(&format!(
            "<div class=\"timeline-block__period\" data-period=\"{}\">",
            escape_attr(&period)
        ));
        for event in group {
            out.push_str(&format!(
                "<div class=\"timeline-event\" style=\"border-color: {accent}\"><div class=\"timeline-event__dot\" style=\"background-color: {accent}\"></div>"
            ));
            push_event_body(&mut out, event);
            out.push_str("</div>");
        }
        out.push_str("</div>");
    }
    out.push_str("</div></div>");
    Ok(out)
}

fn push_event_body(out: &mut String, event: &TimelineEvent) {
    out.push_str(&format!(
        "<span class=\"timeline-event__date\">{}</span><h4 class=\"timeline-event__title\">{}</h4><p class=\"timeline-event__description\">{}</p>",
        escape_html_text(&event.date),
        escape_html_text(&event.title),
        escape_html_text(&event.description)
    ));
}

/// Groups events into periods: years newest first, months newest first,
/// `Unknown` and `Events` after every dated period.
fn group_events(events: &[TimelineEvent], group_by: GroupBy) -> Vec<(String, Vec<&TimelineEvent>)> {
    let mut groups: Vec<(String, Option<NaiveDate>, Vec<&TimelineEvent>)> = Vec::new();
    for event in events {
        let (key, sort_date) = period_key(&event.date, group_by);
        match groups.iter_mut().find(|(existing, _, _)| *existing == key) {
            Some((_, _, members)) => members.push(event),
            None => groups.push((key, sort_date, vec![event])),
        }
    }
    // stable: undated periods keep first-seen order at the end
    groups.sort_by(|a, b| match (a.1, b.1) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    groups
        .into_iter()
        .map(|(key, _, members)| (key, members))
        .collect()
}

fn period_key(date: &str, group_by: GroupBy) -> (String, Option<NaiveDate>) {
    if group_by == GroupBy::None || date.trim().is_empty() {
        return (UNGROUPED_PERIOD.to_string(), None);
    }
    let Some(parsed) = parse_event_date(date) else {
        return (UNKNOWN_PERIOD.to_string(), None);
    };
    match group_by {
        GroupBy::Year => (
            parsed.year().to_string(),
            NaiveDate::from_ymd_opt(parsed.year(), 1, 1),
        ),
        _ => (
            parsed.format("%B %Y").to_string(),
            NaiveDate::from_ymd_opt(parsed.year(), parsed.month(), 1),
        ),
    }
}

fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if value.len() == 4 {
        let year = value.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}
