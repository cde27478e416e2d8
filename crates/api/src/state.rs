use std::sync::Arc;

use steward_db::DbPool;
use steward_events::ChangeBus;
use steward_integrations::{
    Geocoder, HttpGeocodeProvider, HttpIntegrationClient, PgSyncLogStore, PgTouchpointSink,
    SyncProvider, SyncService,
};
use steward_timeline::{SourceRegistry, TimelineAggregator};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Merges the timeline sources into pages and statistics.
    pub timeline: TimelineAggregator,
    /// Row changes feeding live timeline subscriptions.
    pub change_bus: Arc<ChangeBus>,
    /// Address geocoding with a process-wide cache.
    pub geocoder: Arc<Geocoder>,
    /// Chat/meeting sync with its rolling log.
    pub sync: Arc<SyncService>,
}

impl AppState {
    /// Wire the database-backed services from `config`.
    pub fn new(pool: DbPool, config: ServerConfig, change_bus: Arc<ChangeBus>) -> Self {
        let timeline = TimelineAggregator::new(SourceRegistry::postgres(pool.clone()))
            .with_fetch_batch(config.timeline_fetch_batch);

        let geocoder = Geocoder::with_capacity(
            HttpGeocodeProvider::new(config.geocode_base_url.clone(), config.geocode_api_key.clone()),
            config.geocode_cache_capacity,
        );

        let mut sync = SyncService::new(
            Arc::new(PgSyncLogStore::new(pool.clone())),
            Arc::new(PgTouchpointSink::new(pool.clone())),
        );
        for (provider, endpoint) in [
            (SyncProvider::Chat, &config.chat_sync),
            (SyncProvider::Meeting, &config.meeting_sync),
        ] {
            if let Some(endpoint) = endpoint {
                sync = sync.with_client(HttpIntegrationClient::new(
                    provider,
                    endpoint.base_url.clone(),
                    endpoint.token.clone(),
                ));
            }
        }

        Self {
            pool,
            config: Arc::new(config),
            timeline,
            change_bus,
            geocoder: Arc::new(geocoder),
            sync: Arc::new(sync),
        }
    }
}
