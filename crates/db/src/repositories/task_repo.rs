//! Repository for the `tasks` table.

use sqlx::PgPool;
use steward_core::types::DbId;

use crate::models::task::{Task, UpsertTask};
use crate::repositories::sync_id_sequence;
use crate::repositories::timeline_query::{
    fetch_timeline_row, fetch_timeline_rows, TimelineRowQuery, TimelineTable,
};

const TIMELINE: TimelineTable = TimelineTable {
    select: "SELECT t.id, t.client_id, t.project_id, t.donor_move_id, t.title, \
             t.description, t.status, t.priority, t.due_date, t.completed_at, \
             t.assigned_to, t.created_by, u.full_name AS created_by_name, t.created_at \
             FROM tasks t LEFT JOIN users u ON u.id = t.created_by",
    alias: "t",
    // Must agree with `Task::timeline_date`.
    date_expr: "COALESCE(t.completed_at, t.due_date, t.created_at)",
    id_prefix: "task-",
    search_exprs: &["t.title", "t.description"],
};

/// Provides read/write operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Find a task by id, with the creator's name joined in.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        fetch_timeline_row(pool, &TIMELINE, id).await
    }

    /// List tasks for the timeline, newest first.
    pub async fn list_for_timeline(
        pool: &PgPool,
        query: &TimelineRowQuery,
    ) -> Result<Vec<Task>, sqlx::Error> {
        fetch_timeline_rows(pool, &TIMELINE, query).await
    }

    /// Insert or overwrite a task by its fixed id.
    pub async fn upsert(pool: &PgPool, input: &UpsertTask) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tasks \
                (id, client_id, project_id, title, description, status, priority, \
                 due_date, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                client_id = EXCLUDED.client_id, \
                project_id = EXCLUDED.project_id, \
                title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                status = EXCLUDED.status, \
                priority = EXCLUDED.priority, \
                due_date = EXCLUDED.due_date, \
                completed_at = EXCLUDED.completed_at",
        )
        .bind(input.id)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(input.due_date)
        .bind(input.completed_at)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Advance the id sequence past seeded rows.
    pub async fn sync_sequence(pool: &PgPool) -> Result<(), sqlx::Error> {
        sync_id_sequence(pool, "tasks").await
    }
}
