//! Repository for the `cases` table.

use sqlx::PgPool;

use crate::models::case::UpsertCase;
use crate::repositories::sync_id_sequence;

/// Provides write operations for cases.
pub struct CaseRepo;

impl CaseRepo {
    /// Insert or overwrite a case by its fixed id.
    pub async fn upsert(pool: &PgPool, input: &UpsertCase) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO cases \
                (id, client_id, title, description, status, priority, opened_at, closed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                client_id = EXCLUDED.client_id, \
                title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                status = EXCLUDED.status, \
                priority = EXCLUDED.priority, \
                opened_at = EXCLUDED.opened_at, \
                closed_at = EXCLUDED.closed_at, \
                updated_at = now()",
        )
        .bind(input.id)
        .bind(input.client_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(input.opened_at)
        .bind(input.closed_at)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Advance the id sequence past seeded rows.
    pub async fn sync_sequence(pool: &PgPool) -> Result<(), sqlx::Error> {
        sync_id_sequence(pool, "cases").await
    }
}
