//! Repository for the `activities` table.

use sqlx::PgPool;
use steward_core::types::DbId;

use crate::models::activity::{Activity, CreateActivity};
use crate::repositories::timeline_query::{fetch_timeline_rows, TimelineRowQuery, TimelineTable};

/// Column list for `activities` queries, joined with the creator.
const COLUMNS: &str = "\
    a.id, a.client_id, a.project_id, a.donor_move_id, a.activity_type, \
    a.subject, a.description, a.activity_date, a.status, a.priority, \
    a.created_by, u.full_name AS created_by_name, a.created_at";

const TIMELINE: TimelineTable = TimelineTable {
    select: "SELECT a.id, a.client_id, a.project_id, a.donor_move_id, a.activity_type, \
             a.subject, a.description, a.activity_date, a.status, a.priority, \
             a.created_by, u.full_name AS created_by_name, a.created_at \
             FROM activities a LEFT JOIN users u ON u.id = a.created_by",
    alias: "a",
    date_expr: "a.activity_date",
    id_prefix: "activity-",
    search_exprs: &["a.subject", "a.description"],
};

/// Provides read/write operations for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO activities \
                (client_id, project_id, donor_move_id, activity_type, subject, \
                 description, activity_date, status, priority, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.donor_move_id)
        .bind(&input.activity_type)
        .bind(&input.subject)
        .bind(&input.description)
        .bind(input.activity_date)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(input.created_by)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find an activity by its internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities a \
             LEFT JOIN users u ON u.id = a.created_by \
             WHERE a.id = $1"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an activity. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List activities for the timeline, newest first.
    pub async fn list_for_timeline(
        pool: &PgPool,
        query: &TimelineRowQuery,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        fetch_timeline_rows(pool, &TIMELINE, query).await
    }
}
