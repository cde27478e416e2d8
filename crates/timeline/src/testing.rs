//! In-memory sources and event builders for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeZone;
use steward_core::timeline::{EventDetails, EventSource, UnifiedTimelineEvent};
use steward_core::types::{DbId, Timestamp};

use crate::error::FetchError;
use crate::source::{SourceQuery, TimelineSource};

pub fn day(d: u32) -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

/// A source that behaves like a well-formed table read.
pub struct MemorySource {
    source: EventSource,
    events: Vec<UnifiedTimelineEvent>,
    failing: bool,
    ignore_cursor: bool,
    calls: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new(source: EventSource, events: Vec<UnifiedTimelineEvent>) -> Self {
        Self {
            source,
            events,
            failing: false,
            ignore_cursor: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(source: EventSource) -> Self {
        Self {
            failing: true,
            ..Self::new(source, Vec::new())
        }
    }

    /// Misbehaving source that returns the same head batch every time.
    pub fn ignoring_cursor(mut self) -> Self {
        self.ignore_cursor = true;
        self
    }

    /// Shared counter of `fetch` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl TimelineSource for MemorySource {
    fn source(&self) -> EventSource {
        self.source
    }

    async fn fetch(&self, query: &SourceQuery<'_>) -> Result<Vec<UnifiedTimelineEvent>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(FetchError::Unavailable("connection refused".into()));
        }

        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| query.scope.map_or(true, |scope| scope.matches(e)))
            .filter(|e| query.filters.date_from.map_or(true, |from| e.timestamp >= from))
            .filter(|e| query.filters.date_to.map_or(true, |to| e.timestamp <= to))
            .filter(|e| {
                self.ignore_cursor || query.before.as_ref().map_or(true, |cursor| e.is_before(cursor))
            })
            .cloned()
            .collect();
        events.sort_by(|a, b| a.cmp_desc(b));
        events.truncate(query.limit);
        Ok(events)
    }
}

pub fn activity(id: DbId, d: u32, title: &str, client_id: Option<DbId>) -> UnifiedTimelineEvent {
    let mut event = UnifiedTimelineEvent::new(
        id.to_string(),
        day(d),
        title,
        EventDetails::Activity {
            activity_type: "meeting".into(),
            status: Some("completed".into()),
            priority: None,
        },
    );
    event.client_id = client_id;
    event
}

pub fn donation(id: DbId, d: u32, amount: f64, client_id: Option<DbId>) -> UnifiedTimelineEvent {
    let mut event = UnifiedTimelineEvent::new(
        id.to_string(),
        day(d),
        format!("Donation of ${amount:.2}"),
        EventDetails::Donation {
            amount,
            donation_type: Some("one_time".into()),
            status: None,
        },
    );
    event.client_id = client_id;
    event
}

pub fn touchpoint(id: DbId, d: u32, title: &str, creator: Option<&str>) -> UnifiedTimelineEvent {
    let mut event = UnifiedTimelineEvent::new(
        id.to_string(),
        day(d),
        title,
        EventDetails::Touchpoint {
            touchpoint_type: "email".into(),
            sentiment: None,
            engagement_level: None,
        },
    );
    event.created_by_name = creator.map(str::to_string);
    event
}
