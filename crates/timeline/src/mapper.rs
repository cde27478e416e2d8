//! Row → timeline event mappers.
//!
//! One pure function per source. Each is total over well-formed rows and
//! idempotent: the event id depends only on the source and the row id.

use serde::Deserialize;
use steward_core::timeline::{EventDetails, EventSource, UnifiedTimelineEvent};
use steward_core::types::{DbId, Timestamp};
use steward_db::models::activity::Activity;
use steward_db::models::donation::Donation;
use steward_db::models::task::Task;
use steward_db::models::touchpoint::Touchpoint;
use steward_events::RowChange;

use crate::error::FetchError;

/// A project milestone. No table backs these yet; the type fixes the shape
/// the mapper will accept once one exists.
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub client_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub amount: Option<f64>,
    pub target_date: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

/// A logged email, call or message. No table backs these yet.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunicationLogRecord {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub channel: String,
    pub direction: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sent_at: Timestamp,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

/// Cross-references shared by every row type.
struct Refs<'a> {
    client_id: Option<DbId>,
    project_id: Option<DbId>,
    donor_move_id: Option<DbId>,
    created_by: Option<DbId>,
    created_by_name: Option<&'a str>,
}

fn attach(mut event: UnifiedTimelineEvent, description: Option<&str>, refs: Refs<'_>) -> UnifiedTimelineEvent {
    event.description = description.map(str::to_string);
    event.client_id = refs.client_id;
    event.project_id = refs.project_id;
    event.donor_move_id = refs.donor_move_id;
    event.created_by = refs.created_by;
    event.created_by_name = refs.created_by_name.map(str::to_string);
    event
}

pub fn map_activity(row: &Activity) -> UnifiedTimelineEvent {
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.activity_date,
        row.subject.clone(),
        EventDetails::Activity {
            activity_type: row.activity_type.clone(),
            status: row.status.clone(),
            priority: row.priority.clone(),
        },
    );
    attach(
        event,
        row.description.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: row.project_id,
            donor_move_id: row.donor_move_id,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

/// Title of a touchpoint: its summary, else `"<type> touchpoint"`.
///
/// The touchpoint repository's search pushdown mirrors this expression.
pub fn touchpoint_title(row: &Touchpoint) -> String {
    row.summary
        .clone()
        .unwrap_or_else(|| format!("{} touchpoint", row.touchpoint_type))
}

pub fn map_touchpoint(row: &Touchpoint) -> UnifiedTimelineEvent {
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.occurred_at,
        touchpoint_title(row),
        EventDetails::Touchpoint {
            touchpoint_type: row.touchpoint_type.clone(),
            sentiment: row.sentiment.clone(),
            engagement_level: row.engagement_level.clone(),
        },
    );
    attach(
        event,
        row.notes.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: row.project_id,
            donor_move_id: row.donor_move_id,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

pub fn map_task(row: &Task) -> UnifiedTimelineEvent {
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.timeline_date(),
        row.title.clone(),
        EventDetails::Task {
            status: row.status.clone(),
            priority: row.priority.clone(),
            due_date: row.due_date,
        },
    );
    attach(
        event,
        row.description.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: row.project_id,
            donor_move_id: row.donor_move_id,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

pub fn map_donation(row: &Donation) -> UnifiedTimelineEvent {
    let title = match row.campaign.as_deref() {
        Some(campaign) => format!("Donation of ${:.2} ({campaign})", row.amount),
        None => format!("Donation of ${:.2}", row.amount),
    };
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.donation_date,
        title,
        EventDetails::Donation {
            amount: row.amount,
            donation_type: row.donation_type.clone(),
            status: row.status.clone(),
        },
    );
    attach(
        event,
        row.notes.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: row.project_id,
            donor_move_id: row.donor_move_id,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

pub fn map_milestone(row: &MilestoneRecord) -> UnifiedTimelineEvent {
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.completed_at.unwrap_or(row.target_date),
        row.name.clone(),
        EventDetails::ProjectMilestone {
            status: row.status.clone(),
            amount: row.amount,
        },
    );
    attach(
        event,
        row.description.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: Some(row.project_id),
            donor_move_id: None,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

pub fn map_communication_log(row: &CommunicationLogRecord) -> UnifiedTimelineEvent {
    let title = row
        .subject
        .clone()
        .unwrap_or_else(|| format!("{} message", row.channel));
    let event = UnifiedTimelineEvent::new(
        row.id.to_string(),
        row.sent_at,
        title,
        EventDetails::CommunicationLog {
            channel: row.channel.clone(),
            direction: row.direction.clone(),
        },
    );
    attach(
        event,
        row.body.as_deref(),
        Refs {
            client_id: row.client_id,
            project_id: row.project_id,
            donor_move_id: None,
            created_by: row.created_by,
            created_by_name: row.created_by_name.as_deref(),
        },
    )
}

/// Map a realtime row change through the mapper for its table.
///
/// Returns `Ok(None)` for tables that do not feed the timeline.
pub fn map_row_change(change: &RowChange) -> Result<Option<UnifiedTimelineEvent>, FetchError> {
    let Some(source) = EventSource::from_table(&change.table) else {
        return Ok(None);
    };
    let record = change.record.clone();
    let event = match source {
        EventSource::Activity => map_activity(&serde_json::from_value(record)?),
        EventSource::Touchpoint => map_touchpoint(&serde_json::from_value(record)?),
        EventSource::Task => map_task(&serde_json::from_value(record)?),
        EventSource::Donation => map_donation(&serde_json::from_value(record)?),
        EventSource::ProjectMilestone
        | EventSource::CommunicationLog
        | EventSource::CalendarEvent => return Ok(None),
    };
    Ok(Some(event))
}
