//! Repository for the `projects` table.

use sqlx::PgPool;

use crate::models::project::UpsertProject;
use crate::repositories::sync_id_sequence;

/// Provides write operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert or overwrite a project by its fixed id.
    pub async fn upsert(pool: &PgPool, input: &UpsertProject) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO projects \
                (id, client_id, name, description, status, budget, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                client_id = EXCLUDED.client_id, \
                name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                status = EXCLUDED.status, \
                budget = EXCLUDED.budget, \
                start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                updated_at = now()",
        )
        .bind(input.id)
        .bind(input.client_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.status)
        .bind(input.budget)
        .bind(input.start_date)
        .bind(input.end_date)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Count all projects.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM projects")
            .fetch_one(pool)
            .await
    }

    /// Advance the id sequence past seeded rows.
    pub async fn sync_sequence(pool: &PgPool) -> Result<(), sqlx::Error> {
        sync_id_sequence(pool, "projects").await
    }
}
