//! Repository for the `touchpoints` table.

use sqlx::PgPool;
use steward_core::types::DbId;

use crate::models::touchpoint::{Touchpoint, UpsertExternalTouchpoint};
use crate::repositories::timeline_query::{
    fetch_timeline_row, fetch_timeline_rows, TimelineRowQuery, TimelineTable,
};

/// Column list for `touchpoints` queries, joined with the creator.
const COLUMNS: &str = "\
    t.id, t.client_id, t.project_id, t.donor_move_id, t.touchpoint_type, \
    t.summary, t.notes, t.occurred_at, t.sentiment, t.engagement_level, \
    t.external_ref, t.created_by, u.full_name AS created_by_name, t.created_at";

const TIMELINE: TimelineTable = TimelineTable {
    select: "SELECT t.id, t.client_id, t.project_id, t.donor_move_id, t.touchpoint_type, \
             t.summary, t.notes, t.occurred_at, t.sentiment, t.engagement_level, \
             t.external_ref, t.created_by, u.full_name AS created_by_name, t.created_at \
             FROM touchpoints t LEFT JOIN users u ON u.id = t.created_by",
    alias: "t",
    date_expr: "t.occurred_at",
    id_prefix: "touchpoint-",
    // Mirrors the mapped title: summary, else "<type> touchpoint".
    search_exprs: &["COALESCE(t.summary, t.touchpoint_type || ' touchpoint')", "t.notes"],
};

/// Provides read/write operations for touchpoints.
pub struct TouchpointRepo;

impl TouchpointRepo {
    /// Insert a touchpoint from an external system, or refresh the one
    /// already imported under the same `external_ref`.
    pub async fn upsert_external(
        pool: &PgPool,
        input: &UpsertExternalTouchpoint,
    ) -> Result<Touchpoint, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                INSERT INTO touchpoints \
                    (external_ref, client_id, touchpoint_type, summary, notes, occurred_at) \
                VALUES ($1, $2, $3, $4, $5, $6) \
                ON CONFLICT (external_ref) DO UPDATE SET \
                    client_id = EXCLUDED.client_id, \
                    touchpoint_type = EXCLUDED.touchpoint_type, \
                    summary = EXCLUDED.summary, \
                    notes = EXCLUDED.notes, \
                    occurred_at = EXCLUDED.occurred_at \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t LEFT JOIN users u ON u.id = t.created_by"
        );
        sqlx::query_as::<_, Touchpoint>(&query)
            .bind(&input.external_ref)
            .bind(input.client_id)
            .bind(&input.touchpoint_type)
            .bind(&input.summary)
            .bind(&input.notes)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    /// Find a touchpoint by id, with the creator's name joined in.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Touchpoint>, sqlx::Error> {
        fetch_timeline_row(pool, &TIMELINE, id).await
    }

    /// List touchpoints for the timeline, newest first.
    pub async fn list_for_timeline(
        pool: &PgPool,
        query: &TimelineRowQuery,
    ) -> Result<Vec<Touchpoint>, sqlx::Error> {
        fetch_timeline_rows(pool, &TIMELINE, query).await
    }
}
