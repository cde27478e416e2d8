//! Timeline aggregation: concurrent per-source fetches merged into one page.
//!
//! Each enabled source is read as a lazy stream. The stream pulls batches
//! after its own local cursor until it holds `page_size + 1` matching events
//! or runs dry, so every source contributes its newest candidates no matter
//! how many events other sources have. The union of those per-source heads
//! always contains the global head, which makes the merged page exact.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use steward_core::error::CoreError;
use steward_core::timeline::{
    clamp_page_size, compute_summary, EntityScope, EventSource, SourceFailure, TimelineFilters,
    TimelinePage, TimelinePaginationCursor, TimelineSummaryStats, UnifiedTimelineEvent,
    DEFAULT_FETCH_LIMIT, STATS_FETCH_LIMIT,
};
use steward_core::types::Timestamp;

use crate::error::FetchError;
use crate::source::{SourceQuery, SourceRegistry, TimelineSource};

/// Merges every enabled [`TimelineSource`] into cursor-paginated pages.
#[derive(Clone)]
pub struct TimelineAggregator {
    registry: Arc<SourceRegistry>,
    fetch_batch: usize,
}

/// Events gathered across sources for one request, before slicing.
struct Gathered {
    events: Vec<UnifiedTimelineEvent>,
    failures: Vec<SourceFailure>,
}

impl TimelineAggregator {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            fetch_batch: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Minimum number of rows requested from a source per round trip.
    pub fn with_fetch_batch(mut self, fetch_batch: usize) -> Self {
        self.fetch_batch = fetch_batch.max(1);
        self
    }

    /// Fetch one page of the timeline, strictly older than `cursor`.
    ///
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`. Source failures never
    /// fail the call; they are listed in `degraded_sources`. Only an
    /// unparseable entity id is an error.
    pub async fn fetch_timeline(
        &self,
        filters: &TimelineFilters,
        cursor: Option<&TimelinePaginationCursor>,
        page_size: usize,
    ) -> Result<TimelinePage, CoreError> {
        let page_size = clamp_page_size(Some(page_size));
        let scope = filters.entity_scope()?;

        let Gathered {
            mut events,
            failures,
        } = self.gather(filters, scope, cursor, page_size + 1).await;

        let total_count = events.len();
        let has_more = events.len() > page_size;
        events.truncate(page_size);
        let next_cursor = if has_more {
            events.last().map(TimelinePaginationCursor::from_event)
        } else {
            None
        };

        tracing::debug!(
            entity_type = ?filters.entity_type,
            entity_id = %filters.entity_id,
            returned = events.len(),
            total_count,
            has_more,
            degraded = failures.len(),
            "Timeline page assembled"
        );

        Ok(TimelinePage {
            events,
            next_cursor,
            has_more,
            total_count,
            degraded_sources: failures,
        })
    }

    /// Summary statistics over the newest `STATS_FETCH_LIMIT` events of the
    /// entity, across all sources.
    ///
    /// Only the entity scope of `filters` is honoured; source selection,
    /// search and the other narrowing filters are ignored.
    pub async fn summary_stats(
        &self,
        filters: &TimelineFilters,
        now: Timestamp,
    ) -> Result<TimelineSummaryStats, CoreError> {
        let stats_filters = TimelineFilters::for_entity(filters.entity_type, filters.entity_id.clone());
        let scope = stats_filters.entity_scope()?;

        let Gathered {
            mut events,
            failures,
        } = self.gather(&stats_filters, scope, None, STATS_FETCH_LIMIT).await;
        events.truncate(STATS_FETCH_LIMIT);

        if !failures.is_empty() {
            tracing::warn!(
                entity_id = %filters.entity_id,
                degraded = failures.len(),
                "Summary statistics computed without some sources"
            );
        }

        Ok(compute_summary(&events, now))
    }

    /// Run every enabled source concurrently and merge their heads.
    ///
    /// The result is de-duplicated by id and ordered by `(timestamp, id)`
    /// descending. Each source contributes at most `want` events.
    async fn gather(
        &self,
        filters: &TimelineFilters,
        scope: Option<EntityScope>,
        cursor: Option<&TimelinePaginationCursor>,
        want: usize,
    ) -> Gathered {
        let batch = want.max(self.fetch_batch);
        let mut enabled: Vec<EventSource> = filters.event_sources.clone();
        enabled.sort();
        enabled.dedup();

        let streams = enabled.into_iter().filter_map(|source| {
            let fetcher = self.registry.get(source)?;
            Some(async move {
                let base = SourceQuery::new(filters, scope).limit(batch);
                let result = collect_source(fetcher.as_ref(), base, cursor.cloned(), want).await;
                (source, result)
            })
        });

        let mut seen = HashSet::new();
        let mut events = Vec::new();
        let mut failures = Vec::new();

        for (source, result) in join_all(streams).await {
            match result {
                Ok(found) => {
                    events.extend(found.into_iter().filter(|e| seen.insert(e.id.clone())));
                }
                Err(e) => {
                    tracing::warn!(
                        source = %source,
                        error = %e,
                        "Timeline source failed, continuing without it"
                    );
                    failures.push(SourceFailure {
                        source,
                        error: e.to_string(),
                    });
                }
            }
        }

        events.sort_by(|a, b| a.cmp_desc(b));
        Gathered { events, failures }
    }
}

/// Pull batches from one source until it yields `want` matches or runs dry.
async fn collect_source(
    fetcher: &dyn TimelineSource,
    base: SourceQuery<'_>,
    cursor: Option<TimelinePaginationCursor>,
    want: usize,
) -> Result<Vec<UnifiedTimelineEvent>, FetchError> {
    let filters = base.filters;
    let mut before = cursor;
    let mut matched = Vec::new();

    loop {
        let query = base.clone().before(before.clone());
        let batch = fetcher.fetch(&query).await?;
        let exhausted = batch.len() < query.limit;

        let Some(last) = batch.last().map(TimelinePaginationCursor::from_event) else {
            break;
        };
        // A source that ignores the bound would loop forever.
        let advanced = before.as_ref().map_or(true, |prev| {
            (last.timestamp, last.event_id.as_str()) < (prev.timestamp, prev.event_id.as_str())
        });

        matched.extend(batch.into_iter().filter(|event| {
            before.as_ref().map_or(true, |prev| event.is_before(prev)) && filters.matches(event)
        }));

        if matched.len() >= want || exhausted {
            break;
        }
        if !advanced {
            tracing::warn!(
                source = %fetcher.source(),
                "Timeline source did not advance past its cursor, stopping"
            );
            break;
        }
        before = Some(last);
    }

    matched.truncate(want);
    Ok(matched)
}
