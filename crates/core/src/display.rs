//! Display hints (color, icon) for timeline events.
//!
//! Both are derived from the source and sub-type through static tables and
//! are never user-set. Events without a sub-type use the source's hint; a
//! sub-type missing from the tables degrades to the neutral default.

use crate::timeline::EventSource;

/// Neutral color used when nothing more specific applies.
pub const DEFAULT_COLOR: &str = "#6b7280";

/// Neutral icon used when nothing more specific applies.
pub const DEFAULT_ICON: &str = "circle";

/// Colors keyed by event sub-type.
const TYPE_COLORS: &[(&str, &str)] = &[
    ("call", "#3b82f6"),
    ("email", "#8b5cf6"),
    ("meeting", "#10b981"),
    ("note", "#f59e0b"),
    ("event", "#ec4899"),
    ("site_visit", "#14b8a6"),
    ("one_time", "#22c55e"),
    ("recurring", "#16a34a"),
    ("pledge", "#84cc16"),
    ("in_kind", "#65a30d"),
];

/// Icons keyed by event sub-type.
const TYPE_ICONS: &[(&str, &str)] = &[
    ("call", "phone"),
    ("email", "mail"),
    ("meeting", "users"),
    ("note", "file-text"),
    ("event", "calendar"),
    ("site_visit", "map-pin"),
    ("one_time", "dollar-sign"),
    ("recurring", "repeat"),
    ("pledge", "hand-heart"),
    ("in_kind", "package"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn source_color(source: EventSource) -> &'static str {
    match source {
        EventSource::Activity => "#3b82f6",
        EventSource::Touchpoint => "#06b6d4",
        EventSource::Task => "#f97316",
        EventSource::Donation => "#22c55e",
        EventSource::ProjectMilestone => "#a855f7",
        EventSource::CommunicationLog => "#6366f1",
        EventSource::CalendarEvent => "#ec4899",
    }
}

fn source_icon(source: EventSource) -> &'static str {
    match source {
        EventSource::Activity => "activity",
        EventSource::Touchpoint => "message-circle",
        EventSource::Task => "check-square",
        EventSource::Donation => "dollar-sign",
        EventSource::ProjectMilestone => "flag",
        EventSource::CommunicationLog => "message-square",
        EventSource::CalendarEvent => "calendar",
    }
}

pub fn color_for(source: EventSource, event_type: Option<&str>) -> &'static str {
    match event_type {
        Some(t) => lookup(TYPE_COLORS, t).unwrap_or(DEFAULT_COLOR),
        None => source_color(source),
    }
}

pub fn icon_for(source: EventSource, event_type: Option<&str>) -> &'static str {
    match event_type {
        Some(t) => lookup(TYPE_ICONS, t).unwrap_or(DEFAULT_ICON),
        None => source_icon(source),
    }
}
