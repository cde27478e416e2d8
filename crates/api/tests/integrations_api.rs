//! Integration tests for geocoding and integration sync endpoints.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{body_json, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;
use steward_core::types::Timestamp;
use steward_integrations::{
    ExternalRecord, IntegrationClient, PgSyncLogStore, PgTouchpointSink, SyncError, SyncProvider,
    SyncService,
};

struct StaticChat;

#[async_trait]
impl IntegrationClient for StaticChat {
    fn provider(&self) -> SyncProvider {
        SyncProvider::Chat
    }

    async fn pull(&self, _since: Option<Timestamp>) -> Result<Vec<ExternalRecord>, SyncError> {
        Ok(vec![ExternalRecord {
            external_id: "thread-1".into(),
            client_id: Some(1),
            summary: Some("Asked about volunteering".into()),
            notes: None,
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        }])
    }
}

fn app_with_chat(pool: PgPool) -> axum::Router {
    let mut state = common::test_state(pool.clone());
    let sync = SyncService::new(
        Arc::new(PgSyncLogStore::new(pool.clone())),
        Arc::new(PgTouchpointSink::new(pool)),
    )
    .with_client(StaticChat);
    state.sync = Arc::new(sync);
    common::build_test_app_with(state)
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sync_run_is_logged_and_lands_on_timeline(pool: PgPool) {
    let response = post_json(app_with_chat(pool.clone()), "/api/v1/integrations/chat/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entry = body_json(response).await;
    assert_eq!(entry["data"]["status"], "success");
    assert_eq!(entry["data"]["recordsSynced"], 1);

    let log = body_json(get(app_with_chat(pool.clone()), "/api/v1/integrations/sync-log").await).await;
    assert_eq!(log["data"].as_array().unwrap().len(), 1);

    let timeline = body_json(
        get(app_with_chat(pool), "/api/v1/timeline?entity_id=1&sources=touchpoint").await,
    )
    .await;
    assert_eq!(timeline["data"]["events"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unconfigured_provider_returns_503(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/integrations/meeting/sync", json!({})).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "NOT_CONFIGURED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_provider_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/integrations/fax/sync", json!({})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_provider_is_refused(pool: PgPool) {
    let response = put_json(
        app_with_chat(pool.clone()),
        "/api/v1/integrations/chat/config",
        json!({"enabled": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["enabled"], false);

    let response = post_json(app_with_chat(pool), "/api/v1/integrations/chat/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_address_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/geocode?address=%20%20").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_api_key_is_permission_denied(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/geocode?address=12%20Main%20St").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "GEOCODE_PERMISSION_DENIED");
}
