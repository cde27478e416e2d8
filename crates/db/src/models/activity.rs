//! Activity entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steward_core::types::{DbId, Timestamp};

/// A row from the `activities` table joined with the creator's name.
///
/// Realtime payloads carry the bare row, so `created_by_name` defaults to
/// `None` when deserialized from JSON.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub activity_type: String,
    pub subject: String,
    pub description: Option<String>,
    pub activity_date: Timestamp,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new activity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub activity_type: String,
    pub subject: String,
    pub description: Option<String>,
    pub activity_date: Timestamp,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub created_by: Option<DbId>,
}
