//! Case seed record.

use serde::Deserialize;
use steward_core::types::{DbId, Timestamp};

/// Seed record for the case migration script.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCase {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}
