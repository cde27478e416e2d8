//! Repository for the `integration_sync_logs` and `integration_sync_configs`
//! tables.

use sqlx::PgPool;
use steward_core::types::Timestamp;

use crate::models::sync_log::{CreateSyncLog, SyncConfigRow, SyncLogRow};

/// Column list for `integration_sync_logs` queries.
const LOG_COLUMNS: &str = "\
    id, provider, status, started_at, duration_ms, \
    records_total, records_synced, records_failed, error";

/// Column list for `integration_sync_configs` queries.
const CONFIG_COLUMNS: &str = "provider, enabled, last_synced_at, updated_at";

/// Provides read/write operations for the sync log and sync configuration.
pub struct SyncLogRepo;

impl SyncLogRepo {
    /// Append a log entry, returning the stored row.
    pub async fn insert(pool: &PgPool, entry: &CreateSyncLog) -> Result<SyncLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO integration_sync_logs \
                (provider, status, started_at, duration_ms, \
                 records_total, records_synced, records_failed, error) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {LOG_COLUMNS}"
        );
        sqlx::query_as::<_, SyncLogRow>(&query)
            .bind(&entry.provider)
            .bind(&entry.status)
            .bind(entry.started_at)
            .bind(entry.duration_ms)
            .bind(entry.records_total)
            .bind(entry.records_synced)
            .bind(entry.records_failed)
            .bind(&entry.error)
            .fetch_one(pool)
            .await
    }

    /// Delete everything but the newest `keep` entries. Returns rows removed.
    pub async fn prune(pool: &PgPool, keep: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM integration_sync_logs WHERE id NOT IN ( \
                SELECT id FROM integration_sync_logs \
                ORDER BY started_at DESC, id DESC LIMIT $1)",
        )
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List log entries newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<SyncLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM integration_sync_logs \
             ORDER BY started_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, SyncLogRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Fetch the configuration for one provider.
    pub async fn get_config(
        pool: &PgPool,
        provider: &str,
    ) -> Result<Option<SyncConfigRow>, sqlx::Error> {
        let query =
            format!("SELECT {CONFIG_COLUMNS} FROM integration_sync_configs WHERE provider = $1");
        sqlx::query_as::<_, SyncConfigRow>(&query)
            .bind(provider)
            .fetch_optional(pool)
            .await
    }

    /// Set a provider's enabled flag, leaving its sync watermark alone.
    pub async fn set_enabled(
        pool: &PgPool,
        provider: &str,
        enabled: bool,
    ) -> Result<SyncConfigRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO integration_sync_configs (provider, enabled) \
             VALUES ($1, $2) \
             ON CONFLICT (provider) DO UPDATE SET \
                enabled = EXCLUDED.enabled, \
                updated_at = now() \
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, SyncConfigRow>(&query)
            .bind(provider)
            .bind(enabled)
            .fetch_one(pool)
            .await
    }

    /// Record a completed run, leaving the enabled flag alone.
    ///
    /// A provider without a row is created enabled, its initial state.
    pub async fn mark_synced(
        pool: &PgPool,
        provider: &str,
        synced_at: Timestamp,
    ) -> Result<SyncConfigRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO integration_sync_configs (provider, last_synced_at) \
             VALUES ($1, $2) \
             ON CONFLICT (provider) DO UPDATE SET \
                last_synced_at = EXCLUDED.last_synced_at, \
                updated_at = now() \
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, SyncConfigRow>(&query)
            .bind(provider)
            .bind(synced_at)
            .fetch_one(pool)
            .await
    }
}
