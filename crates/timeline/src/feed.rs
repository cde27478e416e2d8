//! Consumer-side timeline state.
//!
//! [`TimelineFeed`] is what a client keeps in memory while showing a
//! timeline: the loaded events, the continuation cursor, and a generation
//! counter. Every load is tagged with the generation it started under;
//! pages that come back after the filters changed are discarded instead of
//! being mixed into the new list.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use steward_core::timeline::{TimelinePage, TimelinePaginationCursor, UnifiedTimelineEvent};

use crate::live::TimelineUpdate;

/// Proof that a load was started, tagged with the feed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    reset: bool,
}

#[derive(Debug, Default)]
pub struct TimelineFeed {
    events: Vec<UnifiedTimelineEvent>,
    next_cursor: Option<TimelinePaginationCursor>,
    has_more: bool,
    generation: u64,
}

impl TimelineFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. `reset` marks a fresh first page (filters changed);
    /// it invalidates every ticket issued before.
    pub fn begin_load(&mut self, reset: bool) -> LoadTicket {
        if reset {
            self.generation += 1;
        }
        LoadTicket {
            generation: self.generation,
            reset,
        }
    }

    /// Cursor to pass with the next page request.
    pub fn next_cursor(&self) -> Option<&TimelinePaginationCursor> {
        self.next_cursor.as_ref()
    }

    /// Apply a fetched page. Returns `false` when the ticket is stale and
    /// the page was dropped.
    pub fn apply_page(&mut self, ticket: LoadTicket, page: TimelinePage) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale timeline page"
            );
            return false;
        }

        if ticket.reset {
            self.events.clear();
        }
        for event in page.events {
            if !self.contains(&event.id) {
                self.events.push(event);
            }
        }
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        true
    }

    /// Replace the event with the same id in place, otherwise prepend it.
    pub fn upsert(&mut self, event: UnifiedTimelineEvent) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.insert(0, event),
        }
    }

    /// Drop an event by id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    pub fn apply_update(&mut self, update: TimelineUpdate) {
        match update {
            TimelineUpdate::Upsert(event) => self.upsert(event),
            TimelineUpdate::Removed { id, .. } => {
                self.remove(&id);
            }
        }
    }

    pub fn events(&self) -> &[UnifiedTimelineEvent] {
        &self.events
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    /// Events grouped by UTC calendar day, newest day first, keeping list
    /// order within a day.
    pub fn grouped_by_day(&self) -> Vec<(NaiveDate, Vec<&UnifiedTimelineEvent>)> {
        let mut days: BTreeMap<NaiveDate, Vec<&UnifiedTimelineEvent>> = BTreeMap::new();
        for event in &self.events {
            days.entry(event.timestamp.date_naive()).or_default().push(event);
        }
        days.into_iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{activity, donation};

    fn page(events: Vec<UnifiedTimelineEvent>, has_more: bool) -> TimelinePage {
        let next_cursor = if has_more {
            events.last().map(TimelinePaginationCursor::from_event)
        } else {
            None
        };
        TimelinePage {
            total_count: events.len(),
            events,
            next_cursor,
            has_more,
            degraded_sources: Vec::new(),
        }
    }

    fn ids(feed: &TimelineFeed) -> Vec<&str> {
        feed.events().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn pages_append_and_track_cursor() {
        let mut feed = TimelineFeed::new();

        let ticket = feed.begin_load(true);
        assert!(feed.apply_page(ticket, page(vec![activity(2, 12, "B", None)], true)));
        assert!(feed.has_more());
        assert_eq!(feed.next_cursor().unwrap().event_id, "activity-2");

        let ticket = feed.begin_load(false);
        assert!(feed.apply_page(ticket, page(vec![activity(1, 10, "A", None)], false)));
        assert_eq!(ids(&feed), vec!["activity-2", "activity-1"]);
        assert!(!feed.has_more());
        assert!(feed.next_cursor().is_none());
    }

    #[test]
    fn stale_page_is_discarded_after_reset() {
        let mut feed = TimelineFeed::new();
        let old = feed.begin_load(true);
        let current = feed.begin_load(true);

        assert!(feed.apply_page(current, page(vec![activity(1, 10, "New filters", None)], false)));
        assert!(!feed.apply_page(old, page(vec![activity(9, 11, "Old filters", None)], false)));

        assert_eq!(ids(&feed), vec!["activity-1"]);
    }

    #[test]
    fn reset_replaces_existing_events() {
        let mut feed = TimelineFeed::new();
        let ticket = feed.begin_load(true);
        feed.apply_page(ticket, page(vec![activity(1, 10, "A", None)], false));

        let ticket = feed.begin_load(true);
        feed.apply_page(ticket, page(vec![donation(5, 11, 10.0, None)], false));

        assert_eq!(ids(&feed), vec!["donation-5"]);
    }

    #[test]
    fn page_overlapping_a_live_insert_is_deduplicated() {
        let mut feed = TimelineFeed::new();
        let ticket = feed.begin_load(true);
        feed.upsert(activity(3, 12, "Live", None));

        feed.apply_page(
            ticket,
            page(vec![activity(3, 12, "Live", None), activity(1, 10, "A", None)], false),
        );

        assert_eq!(ids(&feed), vec!["activity-3", "activity-1"]);
    }

    #[test]
    fn upsert_replaces_in_place_or_prepends() {
        let mut feed = TimelineFeed::new();
        let ticket = feed.begin_load(true);
        feed.apply_page(
            ticket,
            page(vec![activity(2, 12, "B", None), activity(1, 10, "A", None)], false),
        );

        feed.upsert(activity(1, 10, "A edited", None));
        feed.upsert(activity(3, 13, "C", None));

        assert_eq!(ids(&feed), vec!["activity-3", "activity-2", "activity-1"]);
        assert_eq!(feed.events()[2].title, "A edited");
    }

    #[test]
    fn removal_update_drops_event() {
        let mut feed = TimelineFeed::new();
        feed.upsert(activity(1, 10, "A", None));

        feed.apply_update(TimelineUpdate::Removed {
            id: "activity-1".into(),
            source: steward_core::timeline::EventSource::Activity,
        });

        assert!(feed.events().is_empty());
        assert!(!feed.remove("activity-1"));
    }

    #[test]
    fn grouping_is_by_day_newest_first() {
        let mut feed = TimelineFeed::new();
        let ticket = feed.begin_load(true);
        feed.apply_page(
            ticket,
            page(
                vec![
                    donation(1, 12, 5.0, None),
                    activity(2, 12, "Same day", None),
                    activity(3, 10, "Earlier", None),
                ],
                false,
            ),
        );

        let groups = feed.grouped_by_day();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].id, "activity-3");
    }
}
