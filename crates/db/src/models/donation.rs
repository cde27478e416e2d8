//! Donation entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use steward_core::types::{DbId, Timestamp};

/// A row from the `donations` table joined with the creator's name.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub donor_move_id: Option<DbId>,
    pub amount: f64,
    pub donation_type: Option<String>,
    pub status: Option<String>,
    pub campaign: Option<String>,
    pub notes: Option<String>,
    pub donation_date: Timestamp,
    pub created_by: Option<DbId>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    pub created_at: Timestamp,
}

/// Seed record for the donation migration script.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertDonation {
    pub id: DbId,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub amount: f64,
    pub donation_type: Option<String>,
    pub status: Option<String>,
    pub campaign: Option<String>,
    pub donation_date: Timestamp,
}
