//! Chat and meeting platform sync.
//!
//! [`SyncService`] is built once at startup from its collaborators: one
//! [`IntegrationClient`] per provider, a [`SyncSink`] that stores pulled
//! records, and a [`SyncLogStore`] holding the rolling run log and the
//! per-provider configuration. A run never fails half-way: client and
//! per-record errors are caught, counted, and recorded as the run's status.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use steward_core::types::{DbId, Timestamp};
use steward_db::models::sync_log::{CreateSyncLog, SyncConfigRow, SyncLogRow};
use steward_db::models::touchpoint::UpsertExternalTouchpoint;
use steward_db::repositories::{SyncLogRepo, TouchpointRepo};
use tokio::sync::Mutex;

/// Maximum number of run log entries kept; older ones are dropped.
pub const MAX_SYNC_LOG_ENTRIES: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncProvider {
    Chat,
    Meeting,
}

impl SyncProvider {
    pub const ALL: [SyncProvider; 2] = [SyncProvider::Chat, SyncProvider::Meeting];

    pub fn as_str(self) -> &'static str {
        match self {
            SyncProvider::Chat => "chat",
            SyncProvider::Meeting => "meeting",
        }
    }

    /// Touchpoint type recorded for records from this provider.
    pub fn touchpoint_type(self) -> &'static str {
        match self {
            SyncProvider::Chat => "chat",
            SyncProvider::Meeting => "meeting",
        }
    }
}

impl std::fmt::Display for SyncProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncProvider {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SyncError::UnknownProvider(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    Partial,
    Failed,
}

impl SyncStatus {
    /// Classify a run. A client error, or a non-empty run where every
    /// record failed, is a failure; some failures make it partial.
    pub fn classify(records_total: usize, records_failed: usize, client_error: bool) -> Self {
        if client_error || (records_total > 0 && records_failed >= records_total) {
            SyncStatus::Failed
        } else if records_failed > 0 {
            SyncStatus::Partial
        } else {
            SyncStatus::Success
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Partial => "partial",
            SyncStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SyncStatus::Success),
            "partial" => Ok(SyncStatus::Partial),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(SyncError::Store(format!("Unknown sync status: {other}"))),
        }
    }
}

/// One sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    pub provider: SyncProvider,
    pub status: SyncStatus,
    pub started_at: Timestamp,
    pub duration_ms: i64,
    pub records_total: usize,
    pub records_synced: usize,
    pub records_failed: usize,
    pub error: Option<String>,
}

/// Per-provider sync settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub provider: SyncProvider,
    pub enabled: bool,
    /// Start of the last run that was not a failure; the next pull asks
    /// for records since then.
    pub last_synced_at: Option<Timestamp>,
}

impl SyncConfig {
    /// Providers start out enabled and never synced.
    pub fn initial(provider: SyncProvider) -> Self {
        Self {
            provider,
            enabled: true,
            last_synced_at: None,
        }
    }
}

/// A record pulled from an external platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    /// Provider-side id, unique per provider.
    pub external_id: String,
    pub client_id: Option<DbId>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: Timestamp,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Unknown sync provider: {0}")]
    UnknownProvider(String),

    #[error("No client configured for provider: {0}")]
    NotConfigured(SyncProvider),

    #[error("Sync is disabled for provider: {0}")]
    Disabled(SyncProvider),

    /// The remote platform failed or answered with an error.
    #[error("Integration client error: {0}")]
    Client(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The log/config store or the record sink failed.
    #[error("Sync store error: {0}")]
    Store(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Pulls records from one external platform.
#[async_trait]
pub trait IntegrationClient: Send + Sync {
    fn provider(&self) -> SyncProvider;

    async fn pull(&self, since: Option<Timestamp>) -> Result<Vec<ExternalRecord>, SyncError>;
}

/// Stores pulled records.
#[async_trait]
pub trait SyncSink: Send + Sync {
    async fn write(&self, provider: SyncProvider, record: &ExternalRecord) -> Result<(), SyncError>;
}

/// Rolling run log plus per-provider configuration.
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    /// Append an entry, dropping the oldest beyond [`MAX_SYNC_LOG_ENTRIES`].
    async fn append(&self, entry: &SyncLogEntry) -> Result<(), SyncError>;

    /// Newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<SyncLogEntry>, SyncError>;

    async fn config(&self, provider: SyncProvider) -> Result<SyncConfig, SyncError>;

    /// Set only the enabled flag and return the resulting config.
    async fn set_enabled(
        &self,
        provider: SyncProvider,
        enabled: bool,
    ) -> Result<SyncConfig, SyncError>;

    /// Set only the sync watermark. A concurrent enable/disable survives.
    async fn mark_synced(&self, provider: SyncProvider, at: Timestamp) -> Result<(), SyncError>;
}

// ---------------------------------------------------------------------------
// SyncService
// ---------------------------------------------------------------------------

pub struct SyncService {
    clients: HashMap<SyncProvider, Arc<dyn IntegrationClient>>,
    sink: Arc<dyn SyncSink>,
    store: Arc<dyn SyncLogStore>,
}

impl SyncService {
    pub fn new(store: Arc<dyn SyncLogStore>, sink: Arc<dyn SyncSink>) -> Self {
        Self {
            clients: HashMap::new(),
            sink,
            store,
        }
    }

    pub fn with_client(mut self, client: impl IntegrationClient + 'static) -> Self {
        self.clients.insert(client.provider(), Arc::new(client));
        self
    }

    /// Providers with a configured client, in a stable order.
    pub fn providers(&self) -> Vec<SyncProvider> {
        let mut providers: Vec<_> = self.clients.keys().copied().collect();
        providers.sort_by_key(|p| p.as_str());
        providers
    }

    /// Pull from `provider` and store every record.
    ///
    /// Returns the recorded log entry. Errors are returned only when the
    /// run could not start (no client, disabled) or could not be recorded.
    pub async fn run_sync(&self, provider: SyncProvider) -> Result<SyncLogEntry, SyncError> {
        let client = self
            .clients
            .get(&provider)
            .ok_or(SyncError::NotConfigured(provider))?;
        let config = self.store.config(provider).await?;
        if !config.enabled {
            return Err(SyncError::Disabled(provider));
        }

        // Microseconds, matching what the log table stores.
        let started_at = Utc::now().trunc_subsecs(6);
        let timer = Instant::now();
        tracing::info!(provider = %provider, since = ?config.last_synced_at, "Sync started");

        let (records_total, records_failed, client_error, error) =
            match client.pull(config.last_synced_at).await {
                Ok(records) => {
                    let mut failed = 0;
                    let mut first_error = None;
                    for record in &records {
                        if let Err(e) = self.sink.write(provider, record).await {
                            tracing::warn!(
                                provider = %provider,
                                external_id = %record.external_id,
                                error = %e,
                                "Failed to store synced record"
                            );
                            failed += 1;
                            first_error.get_or_insert_with(|| e.to_string());
                        }
                    }
                    (records.len(), failed, false, first_error)
                }
                Err(e) => {
                    tracing::error!(provider = %provider, error = %e, "Sync pull failed");
                    (0, 0, true, Some(e.to_string()))
                }
            };

        let status = SyncStatus::classify(records_total, records_failed, client_error);
        let entry = SyncLogEntry {
            provider,
            status,
            started_at,
            duration_ms: i64::try_from(timer.elapsed().as_millis()).unwrap_or(i64::MAX),
            records_total,
            records_synced: records_total - records_failed,
            records_failed,
            error,
        };

        self.store.append(&entry).await?;
        if status != SyncStatus::Failed {
            self.store.mark_synced(provider, started_at).await?;
        }

        tracing::info!(
            provider = %provider,
            status = status.as_str(),
            duration_ms = entry.duration_ms,
            total = entry.records_total,
            failed = entry.records_failed,
            "Sync finished"
        );
        Ok(entry)
    }

    pub async fn recent_logs(&self, limit: usize) -> Result<Vec<SyncLogEntry>, SyncError> {
        self.store.recent(limit.min(MAX_SYNC_LOG_ENTRIES)).await
    }

    pub async fn config(&self, provider: SyncProvider) -> Result<SyncConfig, SyncError> {
        self.store.config(provider).await
    }

    pub async fn set_enabled(
        &self,
        provider: SyncProvider,
        enabled: bool,
    ) -> Result<SyncConfig, SyncError> {
        let config = self.store.set_enabled(provider, enabled).await?;
        tracing::info!(provider = %provider, enabled, "Sync provider toggled");
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store kept in process memory. Lost on restart.
#[derive(Default)]
pub struct MemorySyncLogStore {
    log: Mutex<VecDeque<SyncLogEntry>>,
    configs: Mutex<HashMap<SyncProvider, SyncConfig>>,
}

impl MemorySyncLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SyncLogStore for MemorySyncLogStore {
    async fn append(&self, entry: &SyncLogEntry) -> Result<(), SyncError> {
        let mut log = self.log.lock().await;
        log.push_front(entry.clone());
        log.truncate(MAX_SYNC_LOG_ENTRIES);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SyncLogEntry>, SyncError> {
        Ok(self.log.lock().await.iter().take(limit).cloned().collect())
    }

    async fn config(&self, provider: SyncProvider) -> Result<SyncConfig, SyncError> {
        Ok(self
            .configs
            .lock()
            .await
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| SyncConfig::initial(provider)))
    }

    async fn set_enabled(
        &self,
        provider: SyncProvider,
        enabled: bool,
    ) -> Result<SyncConfig, SyncError> {
        let mut configs = self.configs.lock().await;
        let config = configs
            .entry(provider)
            .or_insert_with(|| SyncConfig::initial(provider));
        config.enabled = enabled;
        Ok(config.clone())
    }

    async fn mark_synced(&self, provider: SyncProvider, at: Timestamp) -> Result<(), SyncError> {
        self.configs
            .lock()
            .await
            .entry(provider)
            .or_insert_with(|| SyncConfig::initial(provider))
            .last_synced_at = Some(at);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL store and sink
// ---------------------------------------------------------------------------

/// Store backed by the `integration_sync_logs`/`integration_sync_configs`
/// tables.
#[derive(Clone)]
pub struct PgSyncLogStore {
    pool: PgPool,
}

impl PgSyncLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn config_from_row(provider: SyncProvider, row: SyncConfigRow) -> SyncConfig {
    SyncConfig {
        provider,
        enabled: row.enabled,
        last_synced_at: row.last_synced_at,
    }
}

fn count_to_db(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn count_from_db(n: i32) -> usize {
    usize::try_from(n).unwrap_or(0)
}

impl TryFrom<SyncLogRow> for SyncLogEntry {
    type Error = SyncError;

    fn try_from(row: SyncLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            provider: row
                .provider
                .parse()
                .map_err(|_| SyncError::Store(format!("Unknown provider in log: {}", row.provider)))?,
            status: row.status.parse()?,
            started_at: row.started_at,
            duration_ms: row.duration_ms,
            records_total: count_from_db(row.records_total),
            records_synced: count_from_db(row.records_synced),
            records_failed: count_from_db(row.records_failed),
            error: row.error,
        })
    }
}

#[async_trait]
impl SyncLogStore for PgSyncLogStore {
    async fn append(&self, entry: &SyncLogEntry) -> Result<(), SyncError> {
        SyncLogRepo::insert(
            &self.pool,
            &CreateSyncLog {
                provider: entry.provider.as_str().to_string(),
                status: entry.status.as_str().to_string(),
                started_at: entry.started_at,
                duration_ms: entry.duration_ms,
                records_total: count_to_db(entry.records_total),
                records_synced: count_to_db(entry.records_synced),
                records_failed: count_to_db(entry.records_failed),
                error: entry.error.clone(),
            },
        )
        .await?;
        let removed = SyncLogRepo::prune(&self.pool, MAX_SYNC_LOG_ENTRIES as i64).await?;
        if removed > 0 {
            tracing::debug!(removed, "Pruned sync log");
        }
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<SyncLogEntry>, SyncError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        SyncLogRepo::list_recent(&self.pool, limit)
            .await?
            .into_iter()
            .map(SyncLogEntry::try_from)
            .collect()
    }

    async fn config(&self, provider: SyncProvider) -> Result<SyncConfig, SyncError> {
        let row = SyncLogRepo::get_config(&self.pool, provider.as_str()).await?;
        Ok(row.map_or_else(
            || SyncConfig::initial(provider),
            |row| config_from_row(provider, row),
        ))
    }

    async fn set_enabled(
        &self,
        provider: SyncProvider,
        enabled: bool,
    ) -> Result<SyncConfig, SyncError> {
        let row = SyncLogRepo::set_enabled(&self.pool, provider.as_str(), enabled).await?;
        Ok(config_from_row(provider, row))
    }

    async fn mark_synced(&self, provider: SyncProvider, at: Timestamp) -> Result<(), SyncError> {
        SyncLogRepo::mark_synced(&self.pool, provider.as_str(), at).await?;
        Ok(())
    }
}

/// Writes synced records as touchpoints.
///
/// Records are keyed by `"<provider>:<external_id>"`, so re-syncing the
/// same record updates its touchpoint instead of duplicating it. Live
/// subscribers hear about the write through the table trigger.
#[derive(Clone)]
pub struct PgTouchpointSink {
    pool: PgPool,
}

impl PgTouchpointSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncSink for PgTouchpointSink {
    async fn write(&self, provider: SyncProvider, record: &ExternalRecord) -> Result<(), SyncError> {
        let input = UpsertExternalTouchpoint {
            external_ref: format!("{provider}:{}", record.external_id),
            client_id: record.client_id,
            touchpoint_type: provider.touchpoint_type().to_string(),
            summary: record.summary.clone(),
            notes: record.notes.clone(),
            occurred_at: record.occurred_at,
        };
        TouchpointRepo::upsert_external(&self.pool, &input).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Client for a platform exposing `GET {base_url}/records?since=...`
/// returning `{"records": [...]}`.
pub struct HttpIntegrationClient {
    provider: SyncProvider,
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<ExternalRecord>,
}

impl HttpIntegrationClient {
    pub fn new(provider: SyncProvider, base_url: String, token: Option<String>) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }
}

#[async_trait]
impl IntegrationClient for HttpIntegrationClient {
    fn provider(&self) -> SyncProvider {
        self.provider
    }

    async fn pull(&self, since: Option<Timestamp>) -> Result<Vec<ExternalRecord>, SyncError> {
        let mut request = self
            .client
            .get(format!("{}/records", self.base_url.trim_end_matches('/')));
        if let Some(since) = since {
            request = request.query(&[("since", since.to_rfc3339())]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SyncError::Client(format!("{} ({status}): {body}", self.provider)));
        }
        Ok(response.json::<RecordsResponse>().await?.records)
    }
}
