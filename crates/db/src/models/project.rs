//! Project seed record.

use serde::Deserialize;
use steward_core::types::{DbId, Timestamp};

/// Seed record for the project migration script.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProject {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub budget: Option<f64>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}
