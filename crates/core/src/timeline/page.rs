//! Pagination cursor, page envelope and fetch limits.

use serde::{Deserialize, Serialize};

use crate::timeline::event::UnifiedTimelineEvent;
use crate::timeline::source::EventSource;
use crate::types::Timestamp;

/// Default number of events per timeline page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum number of events per timeline page.
pub const MAX_PAGE_SIZE: usize = 200;

/// Default number of rows a single source fetch returns.
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Number of events the summary statistics are computed over.
pub const STATS_FETCH_LIMIT: usize = 1000;

/// Clamp a user-provided page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<usize>) -> usize {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Continuation marker pointing at the last event of a page.
///
/// `event_id` holds the unified id (e.g. `"activity-42"`); together with
/// `timestamp` it forms the `(timestamp, id)` key every fetch is bounded by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePaginationCursor {
    pub timestamp: Timestamp,
    pub event_id: String,
}

impl TimelinePaginationCursor {
    pub fn from_event(event: &UnifiedTimelineEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            event_id: event.id.clone(),
        }
    }
}

/// A source that failed during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub source: EventSource,
    pub error: String,
}

/// One page of the merged timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePage {
    pub events: Vec<UnifiedTimelineEvent>,
    pub next_cursor: Option<TimelinePaginationCursor>,
    pub has_more: bool,
    /// Matching events gathered for this page before slicing.
    pub total_count: usize,
    /// Sources that failed and contributed no events.
    pub degraded_sources: Vec<SourceFailure>,
}

impl TimelinePage {
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            next_cursor: None,
            has_more: false,
            total_count: 0,
            degraded_sources: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(10_000)), MAX_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(15)), 15);
    }
}
