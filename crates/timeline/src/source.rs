//! The per-source fetch seam.
//!
//! A [`TimelineSource`] turns a [`SourceQuery`] into mapped events, newest
//! first. The aggregator only ever talks to sources through this trait, so
//! tests substitute in-memory sources and unbacked tables are served by
//! [`StubSource`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use steward_core::timeline::{
    EntityScope, EventSource, TimelineFilters, TimelinePaginationCursor, UnifiedTimelineEvent,
    DEFAULT_FETCH_LIMIT,
};

use crate::error::FetchError;
use crate::postgres::PgTimelineSource;

/// One fetch request against a single source.
#[derive(Debug, Clone)]
pub struct SourceQuery<'a> {
    pub filters: &'a TimelineFilters,
    /// Resolved entity scope; `None` for pass-through ids.
    pub scope: Option<EntityScope>,
    /// Only events strictly older than this `(timestamp, id)` key.
    pub before: Option<TimelinePaginationCursor>,
    pub limit: usize,
}

impl<'a> SourceQuery<'a> {
    pub fn new(filters: &'a TimelineFilters, scope: Option<EntityScope>) -> Self {
        Self {
            filters,
            scope,
            before: None,
            limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn before(mut self, cursor: Option<TimelinePaginationCursor>) -> Self {
        self.before = cursor;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A fetcher for one event source.
///
/// Implementations must return events ordered by `(timestamp, id)`
/// descending, strictly older than `query.before`, at most `query.limit` of
/// them. A batch shorter than the limit means the source is exhausted.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    fn source(&self) -> EventSource;

    async fn fetch(&self, query: &SourceQuery<'_>) -> Result<Vec<UnifiedTimelineEvent>, FetchError>;
}

/// Source whose backing table does not exist yet. Always empty.
#[derive(Debug, Clone, Copy)]
pub struct StubSource(pub EventSource);

#[async_trait]
impl TimelineSource for StubSource {
    fn source(&self) -> EventSource {
        self.0
    }

    async fn fetch(&self, _query: &SourceQuery<'_>) -> Result<Vec<UnifiedTimelineEvent>, FetchError> {
        Ok(Vec::new())
    }
}

/// One fetcher per [`EventSource`].
#[derive(Clone)]
pub struct SourceRegistry {
    sources: HashMap<EventSource, Arc<dyn TimelineSource>>,
}

impl SourceRegistry {
    /// A registry where every source is a [`StubSource`].
    pub fn new() -> Self {
        let sources = EventSource::ALL
            .into_iter()
            .map(|s| (s, Arc::new(StubSource(s)) as Arc<dyn TimelineSource>))
            .collect();
        Self { sources }
    }

    /// Database-backed sources for every table that exists, stubs for the rest.
    pub fn postgres(pool: PgPool) -> Self {
        EventSource::ALL
            .into_iter()
            .filter_map(|s| PgTimelineSource::new(pool.clone(), s))
            .fold(Self::new(), |registry, source| registry.with_source(source))
    }

    /// Register `source`, replacing whatever served its [`EventSource`].
    pub fn with_source(mut self, source: impl TimelineSource + 'static) -> Self {
        self.sources.insert(source.source(), Arc::new(source));
        self
    }

    pub fn get(&self, source: EventSource) -> Option<Arc<dyn TimelineSource>> {
        self.sources.get(&source).cloned()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
