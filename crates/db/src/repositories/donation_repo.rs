//! Repository for the `donations` table.

use sqlx::PgPool;
use steward_core::types::DbId;

use crate::models::donation::{Donation, UpsertDonation};
use crate::repositories::sync_id_sequence;
use crate::repositories::timeline_query::{
    fetch_timeline_row, fetch_timeline_rows, TimelineRowQuery, TimelineTable,
};

const TIMELINE: TimelineTable = TimelineTable {
    select: "SELECT d.id, d.client_id, d.project_id, d.donor_move_id, d.amount, \
             d.donation_type, d.status, d.campaign, d.notes, d.donation_date, \
             d.created_by, u.full_name AS created_by_name, d.created_at \
             FROM donations d LEFT JOIN users u ON u.id = d.created_by",
    alias: "d",
    date_expr: "d.donation_date",
    id_prefix: "donation-",
    // Titles are formatted from the amount, so search stays in memory.
    search_exprs: &[],
};

/// Provides read/write operations for donations.
pub struct DonationRepo;

impl DonationRepo {
    /// Find a donation by id, with the creator's name joined in.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Donation>, sqlx::Error> {
        fetch_timeline_row(pool, &TIMELINE, id).await
    }

    /// List donations for the timeline, newest first.
    pub async fn list_for_timeline(
        pool: &PgPool,
        query: &TimelineRowQuery,
    ) -> Result<Vec<Donation>, sqlx::Error> {
        fetch_timeline_rows(pool, &TIMELINE, query).await
    }

    /// Insert or overwrite a donation by its fixed id.
    pub async fn upsert(pool: &PgPool, input: &UpsertDonation) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO donations \
                (id, client_id, project_id, amount, donation_type, status, campaign, \
                 donation_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                client_id = EXCLUDED.client_id, \
                project_id = EXCLUDED.project_id, \
                amount = EXCLUDED.amount, \
                donation_type = EXCLUDED.donation_type, \
                status = EXCLUDED.status, \
                campaign = EXCLUDED.campaign, \
                donation_date = EXCLUDED.donation_date",
        )
        .bind(input.id)
        .bind(input.client_id)
        .bind(input.project_id)
        .bind(input.amount)
        .bind(&input.donation_type)
        .bind(&input.status)
        .bind(&input.campaign)
        .bind(input.donation_date)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Advance the id sequence past seeded rows.
    pub async fn sync_sequence(pool: &PgPool) -> Result<(), sqlx::Error> {
        sync_id_sequence(pool, "donations").await
    }
}
