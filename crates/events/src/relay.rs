//! PostgreSQL `NOTIFY` relay.
//!
//! The timeline table triggers send `{table, op, record}` on
//! [`NOTIFY_CHANNEL`], where `record` holds only the row's id and entity
//! references. [`NotifyRelay`] turns each notification into a [`RowChange`]
//! and publishes it on the [`ChangeBus`]:
//!
//! - inserts and updates are re-read through the table's repository, so the
//!   published record is the full row with joined display names;
//! - deletes are published with the key record as sent.
//!
//! The relay is the only publisher of row changes. Writes made through the
//! API, by the migration CLI or by hand all reach live subscribers the same
//! way, in commit order.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use steward_core::types::DbId;
use steward_db::repositories::{ActivityRepo, DonationRepo, TaskRepo, TouchpointRepo};
use tokio_util::sync::CancellationToken;

use crate::bus::{ChangeBus, ChangeOp, RowChange};

/// Channel name used by the `notify_timeline_change()` trigger.
pub const NOTIFY_CHANNEL: &str = "timeline_changes";

/// Pause before retrying after a listener error.
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Undecodable notification: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Notification for {0} carries no row id")]
    MissingId(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Decode a trigger payload.
pub fn parse_notification(payload: &str) -> Result<RowChange, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Read the current state of one timeline row as JSON.
///
/// `Ok(None)` when the row no longer exists or `table` is not a timeline
/// table.
pub async fn load_row(
    pool: &PgPool,
    table: &str,
    id: DbId,
) -> Result<Option<serde_json::Value>, RelayError> {
    match table {
        "activities" => to_json(ActivityRepo::find_by_id(pool, id).await?),
        "touchpoints" => to_json(TouchpointRepo::find_by_id(pool, id).await?),
        "tasks" => to_json(TaskRepo::find_by_id(pool, id).await?),
        "donations" => to_json(DonationRepo::find_by_id(pool, id).await?),
        _ => Ok(None),
    }
}

fn to_json<T: Serialize>(row: Option<T>) -> Result<Option<serde_json::Value>, RelayError> {
    Ok(row.map(serde_json::to_value).transpose()?)
}

/// Complete a key-only change into the change subscribers see.
///
/// Returns `Ok(None)` when an inserted or updated row is already gone; its
/// delete notification follows.
pub async fn resolve_change(pool: &PgPool, change: RowChange) -> Result<Option<RowChange>, RelayError> {
    if change.op == ChangeOp::Delete {
        return Ok(Some(change));
    }

    let id = change.record["id"]
        .as_i64()
        .ok_or_else(|| RelayError::MissingId(change.table.clone()))?;

    let row = load_row(pool, &change.table, id).await?;
    Ok(row.map(|record| RowChange { record, ..change }))
}

/// Background service forwarding database notifications onto the bus.
pub struct NotifyRelay {
    pool: PgPool,
    listener: PgListener,
}

impl NotifyRelay {
    /// Connect and `LISTEN`. Notifications committed after this returns are
    /// delivered by [`NotifyRelay::run`].
    pub async fn listen(pool: PgPool) -> Result<Self, sqlx::Error> {
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;
        tracing::info!(channel = NOTIFY_CHANNEL, "Notify relay listening");
        Ok(Self { pool, listener })
    }

    /// Run the relay loop until `cancel` fires.
    ///
    /// Errors are logged and the loop keeps going; `PgListener` reconnects
    /// on its own, but notifications sent while disconnected are lost.
    pub async fn run(mut self, bus: Arc<ChangeBus>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notify relay shutting down");
                    break;
                }
                received = self.listener.recv() => match received {
                    Ok(notification) => match self.forward(notification.payload()).await {
                        Ok(Some(change)) => bus.publish(change),
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "Dropping notification"),
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "Notify relay receive failed");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
            }
        }
    }

    async fn forward(&self, payload: &str) -> Result<Option<RowChange>, RelayError> {
        let change = parse_notification(payload)?;
        let (table, op) = (change.table.clone(), change.op);
        let resolved = resolve_change(&self.pool, change).await?;
        if resolved.is_none() {
            tracing::debug!(%table, ?op, "Changed row is gone, skipping");
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trigger_payload() {
        let payload = r#"{"table":"activities","op":"INSERT","record":{"id":5,"client_id":2,"project_id":null,"donor_move_id":null}}"#;
        let change = parse_notification(payload).unwrap();
        assert_eq!(change.table, "activities");
        assert_eq!(change.op, ChangeOp::Insert);
        assert_eq!(change.record["id"], 5);
        assert_eq!(change.record["client_id"], 2);
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(parse_notification("not json").is_err());
        assert!(parse_notification(r#"{"table":"activities","op":"TRUNCATE","record":{}}"#).is_err());
    }
}
