//! Touchpoint entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steward_core::types::{DbId, Timestamp};

/// A row from the `touchpoints` table joined with the creator's name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Touchpoint {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub touchpoint_type: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: Timestamp,
    pub sentiment: Option<String>,
    pub engagement_level: Option<String>,
    pub external_ref: Option<String>,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting or refreshing a touchpoint imported from an external
/// system. `external_ref` is the idempotency key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpsertExternalTouchpoint {
    pub external_ref: String,
    pub client_id: Option<DbId>,
    pub touchpoint_type: String,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: Timestamp,
}
