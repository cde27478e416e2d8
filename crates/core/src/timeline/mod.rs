//! Relationship timeline model.
//!
//! The timeline merges activities, touchpoints, tasks, donations, project
//! milestones and communication logs into a single descending feed. This
//! module holds the value types that flow between the fetchers, the
//! aggregator and the API; all of them are transient projections that are
//! recomputed from the database on every query.

pub mod event;
pub mod filters;
pub mod page;
pub mod source;
pub mod stats;

pub use event::{timeline_id, EventDetails, UnifiedTimelineEvent};
pub use filters::{
    is_passthrough_entity, matches_search, EntityScope, EntityType, TimelineFilters,
};
pub use page::{
    clamp_page_size, SourceFailure, TimelinePage, TimelinePaginationCursor, DEFAULT_FETCH_LIMIT,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, STATS_FETCH_LIMIT,
};
pub use source::EventSource;
pub use stats::{compute_summary, DateRange, ParticipantCount, TimelineSummaryStats};
