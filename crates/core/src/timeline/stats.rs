//! Summary statistics over a set of timeline events.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::timeline::event::UnifiedTimelineEvent;
use crate::timeline::source::EventSource;
use crate::types::Timestamp;

/// Number of participants reported in [`TimelineSummaryStats::top_participants`].
pub const TOP_PARTICIPANTS: usize = 5;

/// Trailing window, in days, counted as recent activity.
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Timestamp,
    pub latest: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCount {
    pub name: String,
    pub count: usize,
}

/// Aggregate view of a timeline, recomputed wholesale on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummaryStats {
    pub total_events: usize,
    pub events_by_source: BTreeMap<EventSource, usize>,
    pub date_range: Option<DateRange>,
    pub top_participants: Vec<ParticipantCount>,
    pub recent_activity_count: usize,
}

/// Reduce `events` into summary statistics relative to `now`.
///
/// Participants are keyed by creator display name; ties in the top list are
/// broken alphabetically so the output is deterministic.
pub fn compute_summary(events: &[UnifiedTimelineEvent], now: Timestamp) -> TimelineSummaryStats {
    let mut events_by_source: BTreeMap<EventSource, usize> = BTreeMap::new();
    let mut participants: HashMap<&str, usize> = HashMap::new();
    let mut date_range: Option<DateRange> = None;
    let recent_cutoff = now - chrono::Duration::days(RECENT_WINDOW_DAYS);
    let mut recent_activity_count = 0;

    for event in events {
        *events_by_source.entry(event.source).or_default() += 1;

        if let Some(name) = event.created_by_name.as_deref() {
            *participants.entry(name).or_default() += 1;
        }

        date_range = Some(match date_range {
            None => DateRange {
                earliest: event.timestamp,
                latest: event.timestamp,
            },
            Some(range) => DateRange {
                earliest: range.earliest.min(event.timestamp),
                latest: range.latest.max(event.timestamp),
            },
        });

        if event.timestamp >= recent_cutoff {
            recent_activity_count += 1;
        }
    }

    let mut top_participants: Vec<ParticipantCount> = participants
        .into_iter()
        .map(|(name, count)| ParticipantCount {
            name: name.to_string(),
            count,
        })
        .collect();
    top_participants.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    top_participants.truncate(TOP_PARTICIPANTS);

    TimelineSummaryStats {
        total_events: events.len(),
        events_by_source,
        date_range,
        top_participants,
        recent_activity_count,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::timeline::event::EventDetails;

    fn event(id: &str, days_ago: i64, creator: Option<&str>, now: Timestamp) -> UnifiedTimelineEvent {
        let mut event = UnifiedTimelineEvent::new(
            id,
            now - chrono::Duration::days(days_ago),
            "Touch",
            EventDetails::Touchpoint {
                touchpoint_type: "call".into(),
                sentiment: None,
                engagement_level: None,
            },
        );
        event.created_by_name = creator.map(str::to_string);
        event
    }

    fn now() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = compute_summary(&[], now());
        assert_eq!(stats.total_events, 0);
        assert!(stats.events_by_source.is_empty());
        assert!(stats.date_range.is_none());
        assert!(stats.top_participants.is_empty());
        assert_eq!(stats.recent_activity_count, 0);
    }

    #[test]
    fn counts_sources_range_and_recent_window() {
        let now = now();
        let events = vec![
            event("1", 1, Some("Ana"), now),
            event("2", 29, Some("Ana"), now),
            event("3", 45, Some("Ben"), now),
        ];
        let stats = compute_summary(&events, now);
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.events_by_source[&EventSource::Touchpoint], 3);
        assert_eq!(stats.recent_activity_count, 2);

        let range = stats.date_range.unwrap();
        assert_eq!(range.latest, now - chrono::Duration::days(1));
        assert_eq!(range.earliest, now - chrono::Duration::days(45));
    }

    #[test]
    fn top_participants_are_capped_and_sorted() {
        let now = now();
        let names = ["Ana", "Ana", "Ana", "Ben", "Ben", "Cy", "Di", "Ed", "Flo"];
        let events: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| event(&i.to_string(), 2, Some(name), now))
            .collect();

        let stats = compute_summary(&events, now);
        assert_eq!(stats.top_participants.len(), TOP_PARTICIPANTS);
        assert_eq!(stats.top_participants[0], ParticipantCount { name: "Ana".into(), count: 3 });
        assert_eq!(stats.top_participants[1].name, "Ben");
        assert_eq!(stats.top_participants[2].name, "Cy");
    }

    #[test]
    fn anonymous_events_are_not_participants() {
        let now = now();
        let stats = compute_summary(&[event("1", 1, None, now)], now);
        assert!(stats.top_participants.is_empty());
        assert_eq!(stats.total_events, 1);
    }
}
