//! Relationship timeline aggregation.
//!
//! - [`mapper`]: pure row → [`UnifiedTimelineEvent`] conversions.
//! - [`source`]: the [`TimelineSource`] seam, stub sources and the
//!   per-source registry.
//! - [`postgres`]: database-backed sources.
//! - [`aggregator`]: concurrent fan-out, lazy k-way merge, pagination and
//!   summary statistics.
//! - [`live`]: per-table live update subscriptions.
//! - [`feed`]: consumer-side event list with stale-load protection.
//!
//! [`UnifiedTimelineEvent`]: steward_core::timeline::UnifiedTimelineEvent

pub mod aggregator;
pub mod error;
pub mod feed;
pub mod live;
pub mod mapper;
pub mod postgres;
pub mod source;

#[cfg(test)]
mod testing;

pub use aggregator::TimelineAggregator;
pub use error::FetchError;
pub use feed::{LoadTicket, TimelineFeed};
pub use live::{LiveSubscription, LiveUpdates, TimelineUpdate};
pub use postgres::PgTimelineSource;
pub use source::{SourceQuery, SourceRegistry, StubSource, TimelineSource};
