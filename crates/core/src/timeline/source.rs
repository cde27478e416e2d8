//! The closed set of timeline event sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Origin table / category of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Activity,
    Touchpoint,
    Task,
    Donation,
    ProjectMilestone,
    CommunicationLog,
    CalendarEvent,
}

impl EventSource {
    /// Every source, in display order.
    pub const ALL: [EventSource; 7] = [
        EventSource::Activity,
        EventSource::Touchpoint,
        EventSource::Task,
        EventSource::Donation,
        EventSource::ProjectMilestone,
        EventSource::CommunicationLog,
        EventSource::CalendarEvent,
    ];

    /// Wire name, also used as the prefix of unified event ids.
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Activity => "activity",
            EventSource::Touchpoint => "touchpoint",
            EventSource::Task => "task",
            EventSource::Donation => "donation",
            EventSource::ProjectMilestone => "project_milestone",
            EventSource::CommunicationLog => "communication_log",
            EventSource::CalendarEvent => "calendar_event",
        }
    }

    /// Backing table for sources that have one.
    ///
    /// Milestones, communication logs and calendar events have no table yet.
    pub fn table(self) -> Option<&'static str> {
        match self {
            EventSource::Activity => Some("activities"),
            EventSource::Touchpoint => Some("touchpoints"),
            EventSource::Task => Some("tasks"),
            EventSource::Donation => Some("donations"),
            EventSource::ProjectMilestone
            | EventSource::CommunicationLog
            | EventSource::CalendarEvent => None,
        }
    }

    /// Reverse of [`table`](Self::table).
    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.table() == Some(table))
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown event source: {s}")))
    }
}
