//! Integration tests for the timeline endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{body_json, get};
use sqlx::PgPool;
use steward_core::types::{DbId, Timestamp};
use steward_db::models::activity::CreateActivity;
use steward_db::models::donation::UpsertDonation;
use steward_db::repositories::{ActivityRepo, DonationRepo};

fn day(d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

async fn seed_activity(pool: &PgPool, client_id: DbId, subject: &str, d: u32) {
    ActivityRepo::create(
        pool,
        &CreateActivity {
            client_id: Some(client_id),
            project_id: None,
            donor_move_id: None,
            activity_type: "call".into(),
            subject: subject.into(),
            description: None,
            activity_date: day(d),
            status: None,
            priority: None,
            created_by: None,
        },
    )
    .await
    .unwrap();
}

async fn seed_donation(pool: &PgPool, id: DbId, client_id: DbId, amount: f64, d: u32) {
    DonationRepo::upsert(
        pool,
        &UpsertDonation {
            id,
            client_id: Some(client_id),
            project_id: None,
            amount,
            donation_type: Some("one_time".into()),
            status: Some("received".into()),
            campaign: Some("Spring Gala".into()),
            donation_date: day(d),
        },
    )
    .await
    .unwrap();
}

/// Client 1: activity on the 10th, donation on the 11th, activity on the
/// 12th. Client 2: one activity on the 13th.
async fn seed(pool: &PgPool) {
    seed_activity(pool, 1, "Intro call", 10).await;
    seed_donation(pool, 500, 1, 250.0, 11).await;
    seed_activity(pool, 1, "Follow-up call", 12).await;
    seed_activity(pool, 2, "Other client", 13).await;
}

fn titles(json: &serde_json::Value) -> Vec<String> {
    json["data"]["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: GET /timeline merges sources newest first for one entity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn timeline_merges_sources_for_entity(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/timeline?entity_type=contact&entity_id=1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        titles(&json),
        vec!["Follow-up call", "Donation of $250.00 (Spring Gala)", "Intro call"]
    );
    assert_eq!(json["data"]["hasMore"], false);
    assert!(json["data"]["nextCursor"].is_null());
    assert_eq!(json["data"]["degradedSources"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Test: following nextCursor walks the timeline without gaps or repeats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cursor_pagination_walks_all_events(pool: PgPool) {
    seed(&pool).await;

    let first = body_json(
        get(
            common::build_test_app(pool.clone()),
            "/api/v1/timeline?entity_id=1&page_size=2",
        )
        .await,
    )
    .await;
    assert_eq!(titles(&first).len(), 2);
    assert_eq!(first["data"]["hasMore"], true);

    let cursor = &first["data"]["nextCursor"];
    let uri = format!(
        "/api/v1/timeline?entity_id=1&page_size=2&cursor_ts={}&cursor_id={}",
        cursor["timestamp"].as_str().unwrap(),
        cursor["eventId"].as_str().unwrap(),
    );
    let second = body_json(get(common::build_test_app(pool), &uri).await).await;

    assert_eq!(titles(&second), vec!["Intro call"]);
    assert_eq!(second["data"]["hasMore"], false);
}

// ---------------------------------------------------------------------------
// Test: source selection and the "all" entity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn source_selection_limits_results(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/timeline?entity_id=1&sources=donation").await).await;

    assert_eq!(titles(&json), vec!["Donation of $250.00 (Spring Gala)"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn all_entity_is_not_scoped(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/timeline?entity_id=all").await).await;

    assert_eq!(titles(&json)[0], "Other client");
    assert_eq!(json["data"]["totalCount"], 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_matches_titles(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/timeline?entity_id=1&search=follow").await).await;

    assert_eq!(titles(&json), vec!["Follow-up call"]);
}

// ---------------------------------------------------------------------------
// Test: malformed parameters are rejected with JSON errors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_entity_id_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/timeline?entity_id=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn half_cursor_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/timeline?entity_id=1&cursor_id=activity-1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: GET /timeline/stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn stats_count_events_by_source(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/timeline/stats?entity_type=contact&entity_id=1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["totalEvents"], 3);
    assert_eq!(json["data"]["eventsBySource"]["activity"], 2);
    assert_eq!(json["data"]["eventsBySource"]["donation"], 1);
}
