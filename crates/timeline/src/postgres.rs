//! Database-backed timeline sources.

use async_trait::async_trait;
use sqlx::PgPool;
use steward_core::timeline::{EventSource, UnifiedTimelineEvent};
use steward_db::repositories::{
    ActivityRepo, DonationRepo, TaskRepo, TimelineRowQuery, TouchpointRepo,
};

use crate::error::FetchError;
use crate::mapper;
use crate::source::{SourceQuery, TimelineSource};

/// Fetches one backed source from PostgreSQL and maps the rows.
#[derive(Clone)]
pub struct PgTimelineSource {
    pool: PgPool,
    source: EventSource,
}

impl PgTimelineSource {
    /// `None` when `source` has no table behind it.
    pub fn new(pool: PgPool, source: EventSource) -> Option<Self> {
        source.table().map(|_| Self { pool, source })
    }
}

/// Translate a source query into the repository's row query.
///
/// Date bounds, keyset bound and search are pushed down; the remaining
/// filters are applied in memory by the aggregator.
fn row_query(query: &SourceQuery<'_>) -> TimelineRowQuery {
    TimelineRowQuery {
        scope: query.scope.map(|scope| (scope.column(), scope.entity_id)),
        date_from: query.filters.date_from,
        date_to: query.filters.date_to,
        before: query
            .before
            .as_ref()
            .map(|cursor| (cursor.timestamp, cursor.event_id.clone())),
        search: query.filters.search_term().map(str::to_string),
        limit: i64::try_from(query.limit).unwrap_or(i64::MAX),
    }
}

#[async_trait]
impl TimelineSource for PgTimelineSource {
    fn source(&self) -> EventSource {
        self.source
    }

    async fn fetch(&self, query: &SourceQuery<'_>) -> Result<Vec<UnifiedTimelineEvent>, FetchError> {
        let rows = row_query(query);
        let events = match self.source {
            EventSource::Activity => ActivityRepo::list_for_timeline(&self.pool, &rows)
                .await?
                .iter()
                .map(mapper::map_activity)
                .collect(),
            EventSource::Touchpoint => TouchpointRepo::list_for_timeline(&self.pool, &rows)
                .await?
                .iter()
                .map(mapper::map_touchpoint)
                .collect(),
            EventSource::Task => TaskRepo::list_for_timeline(&self.pool, &rows)
                .await?
                .iter()
                .map(mapper::map_task)
                .collect(),
            EventSource::Donation => DonationRepo::list_for_timeline(&self.pool, &rows)
                .await?
                .iter()
                .map(mapper::map_donation)
                .collect(),
            EventSource::ProjectMilestone
            | EventSource::CommunicationLog
            | EventSource::CalendarEvent => Vec::new(),
        };
        Ok(events)
    }
}
