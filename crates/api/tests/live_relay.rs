//! End-to-end live updates: table trigger -> notify relay -> change bus ->
//! live timeline subscription, against a real database.

mod common;

use std::time::Duration;

use sqlx::PgPool;
use steward_core::timeline::{EntityType, EventSource};
use steward_timeline::{LiveUpdates, TimelineUpdate};
use tokio::sync::mpsc;

async fn next_update(updates: &mut mpsc::UnboundedReceiver<TimelineUpdate>) -> TimelineUpdate {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("no live update within 5s")
        .unwrap()
}

async fn insert_user(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (full_name, email) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("{}@example.org", name.to_lowercase().replace(' ', ".")))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_activity(pool: &PgPool, client_id: i64, subject: &str, description: &str, created_by: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO activities (client_id, activity_type, subject, description, activity_date, created_by) \
         VALUES ($1, 'meeting', $2, $3, now(), $4) RETURNING id",
    )
    .bind(client_id)
    .bind(subject)
    .bind(description)
    .bind(created_by)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn raw_sql_writes_reach_live_subscribers(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let relay = common::spawn_relay(&state).await;

    let (tx, mut updates) = mpsc::unbounded_channel();
    let subscription = LiveUpdates::subscribe(&state.change_bus, EntityType::Contact, "1", move |update| {
        let _ = tx.send(update);
    })
    .unwrap();

    let author = insert_user(&pool, "Dana Field").await;
    let description = "y".repeat(9 * 1024);
    let id = insert_activity(&pool, 1, "Site visit", &description, author).await;

    match next_update(&mut updates).await {
        TimelineUpdate::Upsert(event) => {
            assert_eq!(event.id, format!("activity-{id}"));
            assert_eq!(event.title, "Site visit");
            assert_eq!(event.created_by, Some(author));
            assert_eq!(event.created_by_name.as_deref(), Some("Dana Field"));
            assert_eq!(event.description.as_deref().map(str::len), Some(9 * 1024));
        }
        other => panic!("expected an upsert, got {other:?}"),
    }

    sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(
        next_update(&mut updates).await,
        TimelineUpdate::Removed {
            id: format!("activity-{id}"),
            source: EventSource::Activity,
        }
    );

    subscription.unsubscribe().await;
    relay.cancel();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn other_clients_rows_are_not_delivered(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let relay = common::spawn_relay(&state).await;

    let (tx, mut updates) = mpsc::unbounded_channel();
    let subscription = LiveUpdates::subscribe(&state.change_bus, EntityType::Contact, "1", move |update| {
        let _ = tx.send(update);
    })
    .unwrap();

    let author = insert_user(&pool, "Lee Park").await;
    let other = insert_activity(&pool, 2, "Someone else", "", author).await;
    sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(other)
        .execute(&pool)
        .await
        .unwrap();
    let mine = insert_activity(&pool, 1, "Mine", "", author).await;

    assert_eq!(next_update(&mut updates).await.id(), format!("activity-{mine}"));

    subscription.unsubscribe().await;
    relay.cancel();
}
