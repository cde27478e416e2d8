//! Third-party integrations: address geocoding and chat/meeting sync.

pub mod geocode;
pub mod sync;

pub use geocode::{Coordinates, GeocodeError, GeocodeProvider, Geocoder, HttpGeocodeProvider};
pub use sync::{
    ExternalRecord, HttpIntegrationClient, IntegrationClient, MemorySyncLogStore, PgSyncLogStore,
    PgTouchpointSink, SyncConfig, SyncError, SyncLogEntry, SyncLogStore, SyncProvider,
    SyncService, SyncSink, SyncStatus, MAX_SYNC_LOG_ENTRIES,
};
