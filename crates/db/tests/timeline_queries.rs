//! Integration tests for the timeline-facing repositories.

use chrono::TimeZone;
use sqlx::PgPool;
use steward_core::types::{DbId, Timestamp};
use steward_db::models::activity::CreateActivity;
use steward_db::models::donation::UpsertDonation;
use steward_db::models::sync_log::CreateSyncLog;
use steward_db::models::task::UpsertTask;
use steward_db::models::touchpoint::UpsertExternalTouchpoint;
use steward_db::repositories::{
    ActivityRepo, DonationRepo, SyncLogRepo, TaskRepo, TimelineRowQuery, TouchpointRepo,
};

fn day(d: u32) -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

async fn seed_user(pool: &PgPool) -> DbId {
    sqlx::query_scalar("INSERT INTO users (full_name, email) VALUES ('Ana Ruiz', 'ana@example.org') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn activity(client_id: DbId, subject: &str, date: Timestamp, created_by: Option<DbId>) -> CreateActivity {
    CreateActivity {
        client_id: Some(client_id),
        project_id: None,
        donor_move_id: None,
        activity_type: "meeting".into(),
        subject: subject.into(),
        description: None,
        activity_date: date,
        status: Some("completed".into()),
        priority: None,
        created_by,
    }
}

fn query(limit: i64) -> TimelineRowQuery {
    TimelineRowQuery {
        limit,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_joins_creator_name(pool: PgPool) {
    let user = seed_user(&pool).await;
    let created = ActivityRepo::create(&pool, &activity(1, "Intro call", day(10), Some(user)))
        .await
        .unwrap();

    assert_eq!(created.subject, "Intro call");
    assert_eq!(created.created_by_name.as_deref(), Some("Ana Ruiz"));
}

#[sqlx::test(migrations = "./migrations")]
async fn timeline_listing_is_scoped_and_newest_first(pool: PgPool) {
    ActivityRepo::create(&pool, &activity(1, "Older", day(10), None)).await.unwrap();
    ActivityRepo::create(&pool, &activity(1, "Newer", day(12), None)).await.unwrap();
    ActivityRepo::create(&pool, &activity(2, "Other client", day(11), None)).await.unwrap();

    let rows = ActivityRepo::list_for_timeline(
        &pool,
        &TimelineRowQuery {
            scope: Some(("client_id", 1)),
            ..query(10)
        },
    )
    .await
    .unwrap();

    let subjects: Vec<_> = rows.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Newer", "Older"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn keyset_bound_breaks_timestamp_ties(pool: PgPool) {
    let a = ActivityRepo::create(&pool, &activity(1, "A", day(10), None)).await.unwrap();
    let b = ActivityRepo::create(&pool, &activity(1, "B", day(10), None)).await.unwrap();

    // Same timestamp: the larger unified id comes first.
    let (first, second) = if format!("activity-{}", a.id) > format!("activity-{}", b.id) {
        (a, b)
    } else {
        (b, a)
    };

    let rows = ActivityRepo::list_for_timeline(
        &pool,
        &TimelineRowQuery {
            before: Some((day(10), format!("activity-{}", first.id))),
            ..query(10)
        },
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_and_date_bounds_are_pushed_down(pool: PgPool) {
    ActivityRepo::create(&pool, &activity(1, "Gala planning session", day(10), None)).await.unwrap();
    ActivityRepo::create(&pool, &activity(1, "Budget review", day(11), None)).await.unwrap();
    ActivityRepo::create(&pool, &activity(1, "GALA debrief", day(20), None)).await.unwrap();

    let rows = ActivityRepo::list_for_timeline(
        &pool,
        &TimelineRowQuery {
            search: Some("gala".into()),
            date_to: Some(day(15)),
            ..query(10)
        },
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].subject, "Gala planning session");
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_reports_whether_a_row_was_removed(pool: PgPool) {
    let created = ActivityRepo::create(&pool, &activity(1, "Temp", day(10), None)).await.unwrap();

    assert!(ActivityRepo::delete(&pool, created.id).await.unwrap());
    assert!(!ActivityRepo::delete(&pool, created.id).await.unwrap());
    assert!(ActivityRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Tasks, donations, touchpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn tasks_are_positioned_by_completion_then_due_date(pool: PgPool) {
    let base = UpsertTask {
        id: 1,
        client_id: Some(1),
        project_id: None,
        title: "Send report".into(),
        description: None,
        status: "done".into(),
        priority: None,
        due_date: Some(day(5)),
        completed_at: Some(day(15)),
    };
    TaskRepo::upsert(&pool, &base).await.unwrap();
    TaskRepo::upsert(
        &pool,
        &UpsertTask {
            id: 2,
            title: "Plan visit".into(),
            status: "open".into(),
            due_date: Some(day(20)),
            completed_at: None,
            ..base.clone()
        },
    )
    .await
    .unwrap();
    TaskRepo::sync_sequence(&pool).await.unwrap();

    let rows = TaskRepo::list_for_timeline(
        &pool,
        &TimelineRowQuery {
            date_from: Some(day(10)),
            date_to: Some(day(16)),
            ..query(10)
        },
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].timeline_date(), day(15));
}

#[sqlx::test(migrations = "./migrations")]
async fn donation_upsert_overwrites_by_id(pool: PgPool) {
    let mut seed = UpsertDonation {
        id: 7,
        client_id: Some(1),
        project_id: None,
        amount: 25.0,
        donation_type: Some("one_time".into()),
        status: None,
        campaign: None,
        donation_date: day(12),
    };
    DonationRepo::upsert(&pool, &seed).await.unwrap();
    seed.amount = 40.0;
    DonationRepo::upsert(&pool, &seed).await.unwrap();

    let rows = DonationRepo::list_for_timeline(&pool, &query(10)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 40.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn external_touchpoint_upsert_is_idempotent(pool: PgPool) {
    let input = UpsertExternalTouchpoint {
        external_ref: "chat:C1:1700000000.1".into(),
        client_id: Some(3),
        touchpoint_type: "chat".into(),
        summary: Some("Asked about volunteering".into()),
        notes: None,
        occurred_at: day(9),
    };
    let first = TouchpointRepo::upsert_external(&pool, &input).await.unwrap();
    let second = TouchpointRepo::upsert_external(&pool, &input).await.unwrap();

    assert_eq!(first.id, second.id);
    let rows = TouchpointRepo::list_for_timeline(&pool, &query(10)).await.unwrap();
    assert_eq!(rows.len(), 1);
}

// ---------------------------------------------------------------------------
// Sync log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn rows_larger_than_a_notify_payload_can_be_written(pool: PgPool) {
    let mut input = activity(1, "Grant narrative", day(3), None);
    input.description = Some("z".repeat(9 * 1024));

    let created = ActivityRepo::create(&pool, &input).await.unwrap();

    assert_eq!(created.description.map(|d| d.len()), Some(9 * 1024));
}

#[sqlx::test(migrations = "./migrations")]
async fn find_by_id_joins_the_creator_name(pool: PgPool) {
    let user = seed_user(&pool).await;
    let id: DbId = sqlx::query_scalar(
        "INSERT INTO donations (client_id, amount, donation_date, created_by) \
         VALUES (1, 50.0, now(), $1) RETURNING id",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .unwrap();

    let donation = DonationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(donation.created_by, Some(user));
    assert_eq!(donation.created_by_name.as_deref(), Some("Ana Ruiz"));

    assert!(DonationRepo::find_by_id(&pool, id + 1).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, 1).await.unwrap().is_none());
    assert!(TouchpointRepo::find_by_id(&pool, 1).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn sync_log_prune_keeps_newest_entries(pool: PgPool) {
    for i in 0..5u32 {
        SyncLogRepo::insert(
            &pool,
            &CreateSyncLog {
                provider: "chat".into(),
                status: "success".into(),
                started_at: day(1 + i),
                duration_ms: 10,
                records_total: 1,
                records_synced: 1,
                records_failed: 0,
                error: None,
            },
        )
        .await
        .unwrap();
    }

    let removed = SyncLogRepo::prune(&pool, 3).await.unwrap();
    assert_eq!(removed, 2);

    let rows = SyncLogRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].started_at, day(5));
}

#[sqlx::test(migrations = "./migrations")]
async fn sync_config_writers_touch_only_their_column(pool: PgPool) {
    let created = SyncLogRepo::mark_synced(&pool, "meeting", day(3)).await.unwrap();
    assert!(created.enabled);

    let disabled = SyncLogRepo::set_enabled(&pool, "meeting", false).await.unwrap();
    assert!(!disabled.enabled);
    assert_eq!(disabled.last_synced_at, Some(day(3)));

    let synced = SyncLogRepo::mark_synced(&pool, "meeting", day(4)).await.unwrap();
    assert!(!synced.enabled);
    assert_eq!(synced.last_synced_at, Some(day(4)));
}
