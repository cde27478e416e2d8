//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steward_core::types::{DbId, Timestamp};

/// A row from the `tasks` table joined with the creator's name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: Timestamp,
}

impl Task {
    /// The moment the task sits at on the timeline: completion, else due
    /// date, else creation.
    pub fn timeline_date(&self) -> Timestamp {
        self.completed_at
            .or(self.due_date)
            .unwrap_or(self.created_at)
    }
}

/// Seed record for the task migration script.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTask {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
