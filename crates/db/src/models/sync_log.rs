//! Integration sync log and configuration models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steward_core::types::{DbId, Timestamp};

/// A row from the `integration_sync_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncLogRow {
    pub id: DbId,
    pub provider: String,
    pub status: String,
    pub started_at: Timestamp,
    pub duration_ms: i64,
    pub records_total: i32,
    pub records_synced: i32,
    pub records_failed: i32,
    pub error: Option<String>,
}

/// DTO for appending a sync log entry.
#[derive(Debug, Clone)]
pub struct CreateSyncLog {
    pub provider: String,
    pub status: String,
    pub started_at: Timestamp,
    pub duration_ms: i64,
    pub records_total: i32,
    pub records_synced: i32,
    pub records_failed: i32,
    pub error: Option<String>,
}

/// A row from the `integration_sync_configs` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncConfigRow {
    pub provider: String,
    pub enabled: bool,
    pub last_synced_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}
