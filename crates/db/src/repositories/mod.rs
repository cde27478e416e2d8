//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod case_repo;
pub mod donation_repo;
pub mod project_repo;
pub mod sync_log_repo;
pub mod task_repo;
pub mod timeline_query;
pub mod touchpoint_repo;

pub use activity_repo::ActivityRepo;
pub use case_repo::CaseRepo;
pub use donation_repo::DonationRepo;
pub use project_repo::ProjectRepo;
pub use sync_log_repo::SyncLogRepo;
pub use task_repo::TaskRepo;
pub use timeline_query::TimelineRowQuery;
pub use touchpoint_repo::TouchpointRepo;

use sqlx::PgPool;

/// Move a table's id sequence past the highest explicit id.
///
/// Needed after upserting seed rows with fixed ids so later inserts do not
/// collide. `table` must be a trusted identifier.
pub(crate) async fn sync_id_sequence(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    let query = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         GREATEST((SELECT MAX(id) FROM {table}), 1))"
    );
    sqlx::query(&query).execute(pool).await.map(|_| ())
}
