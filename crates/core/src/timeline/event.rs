//! The unified timeline event and its per-source details.

use serde::{Deserialize, Serialize};

use crate::display;
use crate::timeline::page::TimelinePaginationCursor;
use crate::timeline::source::EventSource;
use crate::types::{DbId, Timestamp};

/// Build the globally unique id of a timeline event.
///
/// The id depends only on the source and the origin id, so re-mapping the
/// same row always produces the same id.
pub fn timeline_id(source: EventSource, event_id: &str) -> String {
    format!("{}-{event_id}", source.as_str())
}

/// Source-specific classification fields.
///
/// Each variant carries only what its source actually records, so
/// consumers match exhaustively instead of probing optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventDetails {
    Activity {
        activity_type: String,
        status: Option<String>,
        priority: Option<String>,
    },
    Touchpoint {
        touchpoint_type: String,
        sentiment: Option<String>,
        engagement_level: Option<String>,
    },
    Task {
        status: String,
        priority: Option<String>,
        due_date: Option<Timestamp>,
    },
    Donation {
        amount: f64,
        donation_type: Option<String>,
        status: Option<String>,
    },
    ProjectMilestone {
        status: Option<String>,
        amount: Option<f64>,
    },
    CommunicationLog {
        channel: String,
        direction: Option<String>,
    },
    CalendarEvent {
        location: Option<String>,
    },
}

impl EventDetails {
    pub fn source(&self) -> EventSource {
        match self {
            EventDetails::Activity { .. } => EventSource::Activity,
            EventDetails::Touchpoint { .. } => EventSource::Touchpoint,
            EventDetails::Task { .. } => EventSource::Task,
            EventDetails::Donation { .. } => EventSource::Donation,
            EventDetails::ProjectMilestone { .. } => EventSource::ProjectMilestone,
            EventDetails::CommunicationLog { .. } => EventSource::CommunicationLog,
            EventDetails::CalendarEvent { .. } => EventSource::CalendarEvent,
        }
    }

    /// The sub-type used for display hints and `event_types` filtering.
    pub fn event_type(&self) -> Option<&str> {
        match self {
            EventDetails::Activity { activity_type, .. } => Some(activity_type),
            EventDetails::Touchpoint { touchpoint_type, .. } => Some(touchpoint_type),
            EventDetails::Donation { donation_type, .. } => donation_type.as_deref(),
            EventDetails::CommunicationLog { channel, .. } => Some(channel),
            EventDetails::Task { .. }
            | EventDetails::ProjectMilestone { .. }
            | EventDetails::CalendarEvent { .. } => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            EventDetails::Activity { status, .. }
            | EventDetails::Donation { status, .. }
            | EventDetails::ProjectMilestone { status, .. } => status.as_deref(),
            EventDetails::Task { status, .. } => Some(status),
            EventDetails::Touchpoint { .. }
            | EventDetails::CommunicationLog { .. }
            | EventDetails::CalendarEvent { .. } => None,
        }
    }

    pub fn priority(&self) -> Option<&str> {
        match self {
            EventDetails::Activity { priority, .. } | EventDetails::Task { priority, .. } => {
                priority.as_deref()
            }
            _ => None,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            EventDetails::Donation { amount, .. } => Some(*amount),
            EventDetails::ProjectMilestone { amount, .. } => *amount,
            _ => None,
        }
    }
}

/// One entry of the merged relationship timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedTimelineEvent {
    pub id: String,
    pub event_id: String,
    pub source: EventSource,
    pub timestamp: Timestamp,
    pub title: String,
    pub description: Option<String>,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_by_name: Option<String>,
    pub color: String,
    pub icon: String,
    #[serde(flatten)]
    pub details: EventDetails,
}

impl UnifiedTimelineEvent {
    /// Create an event with its id and display hints derived from `details`.
    ///
    /// Cross-references and provenance default to `None`; the mappers fill
    /// them in with struct update syntax or direct assignment.
    pub fn new(
        event_id: impl Into<String>,
        timestamp: Timestamp,
        title: impl Into<String>,
        details: EventDetails,
    ) -> Self {
        let event_id = event_id.into();
        let source = details.source();
        let event_type = details.event_type();
        Self {
            id: timeline_id(source, &event_id),
            color: display::color_for(source, event_type).to_string(),
            icon: display::icon_for(source, event_type).to_string(),
            event_id,
            source,
            timestamp,
            title: title.into(),
            description: None,
            client_id: None,
            project_id: None,
            donor_move_id: None,
            created_by: None,
            created_by_name: None,
            details,
        }
    }

    /// Whether this event sorts strictly after `cursor` in descending order,
    /// i.e. belongs on a later page.
    pub fn is_before(&self, cursor: &TimelinePaginationCursor) -> bool {
        (self.timestamp, self.id.as_str()) < (cursor.timestamp, cursor.event_id.as_str())
    }

    /// Descending comparison on `(timestamp, id)`.
    pub fn cmp_desc(&self, other: &Self) -> std::cmp::Ordering {
        (other.timestamp, other.id.as_str()).cmp(&(self.timestamp, self.id.as_str()))
    }
}
