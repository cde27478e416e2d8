//! Live timeline updates.
//!
//! [`LiveUpdates::subscribe`] opens one listener per timeline table on the
//! [`ChangeBus`]. Each listener maps inserted and updated rows through the
//! same mappers the fetchers use, turns deletes into removals by id, drops
//! anything outside the entity scope and hands the rest to the callback.
//! There is no replay: changes published while nobody listens are gone, and
//! a lagging listener skips ahead.

use std::sync::Arc;

use serde::Deserialize;
use steward_core::error::CoreError;
use steward_core::timeline::{
    timeline_id, EntityScope, EntityType, EventSource, TimelineFilters, UnifiedTimelineEvent,
};
use steward_core::types::DbId;
use steward_events::{ChangeBus, ChangeOp, RowChange};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::mapper::map_row_change;

/// A change to one event of a live timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineUpdate {
    /// Inserted or updated; replace by id or prepend.
    Upsert(UnifiedTimelineEvent),
    /// The backing row was deleted.
    Removed { id: String, source: EventSource },
}

impl TimelineUpdate {
    pub fn id(&self) -> &str {
        match self {
            TimelineUpdate::Upsert(event) => &event.id,
            TimelineUpdate::Removed { id, .. } => id,
        }
    }
}

type UpdateCallback = Arc<dyn Fn(TimelineUpdate) + Send + Sync>;

pub struct LiveUpdates;

impl LiveUpdates {
    /// Subscribe to changes affecting one entity's timeline.
    ///
    /// Listeners are registered on the bus before this returns, so every
    /// change published afterwards is seen. Must be called inside a Tokio
    /// runtime.
    pub fn subscribe<F>(
        bus: &ChangeBus,
        entity_type: EntityType,
        entity_id: &str,
        on_update: F,
    ) -> Result<LiveSubscription, CoreError>
    where
        F: Fn(TimelineUpdate) + Send + Sync + 'static,
    {
        let scope = TimelineFilters::for_entity(entity_type, entity_id).entity_scope()?;
        let on_update: UpdateCallback = Arc::new(on_update);
        let cancel = CancellationToken::new();

        let tasks = EventSource::ALL
            .into_iter()
            .filter_map(|source| source.table().map(|table| (source, table)))
            .map(|(source, table)| {
                let listener = TableListener {
                    source,
                    table,
                    scope,
                    receiver: bus.subscribe(),
                    on_update: Arc::clone(&on_update),
                };
                tokio::spawn(listener.run(cancel.child_token()))
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            entity_type = ?entity_type,
            entity_id,
            tables = tasks.len(),
            "Live timeline subscription opened"
        );

        Ok(LiveSubscription { cancel, tasks })
    }
}

/// Handle to an open live subscription. Dropping it also tears it down.
#[derive(Debug)]
pub struct LiveSubscription {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveSubscription {
    /// Stop every per-table listener and wait for them to exit.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Live timeline listener ended abnormally");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Key and entity references carried by a delete.
#[derive(Debug, Deserialize)]
struct RemovedRow {
    id: DbId,
    client_id: Option<DbId>,
    project_id: Option<DbId>,
    donor_move_id: Option<DbId>,
}

struct TableListener {
    source: EventSource,
    table: &'static str,
    scope: Option<EntityScope>,
    receiver: Receiver<RowChange>,
    on_update: UpdateCallback,
}

impl TableListener {
    async fn run(mut self, cancel: CancellationToken) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = self.receiver.recv() => received,
            };
            match received {
                Ok(change) if change.table == self.table => self.handle(&change),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(table = self.table, skipped, "Live timeline listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn handle(&self, change: &RowChange) {
        let update = match change.op {
            ChangeOp::Insert | ChangeOp::Update => self.upsert(change),
            ChangeOp::Delete => self.removal(change),
        };
        if let Some(update) = update {
            (self.on_update)(update);
        }
    }

    fn upsert(&self, change: &RowChange) -> Option<TimelineUpdate> {
        let event = match map_row_change(change) {
            Ok(event) => event?,
            Err(e) => {
                tracing::warn!(table = self.table, error = %e, "Skipping undecodable row change");
                return None;
            }
        };
        if self.scope.is_some_and(|scope| !scope.matches(&event)) {
            return None;
        }
        Some(TimelineUpdate::Upsert(event))
    }

    fn removal(&self, change: &RowChange) -> Option<TimelineUpdate> {
        let row: RemovedRow = match serde_json::from_value(change.record.clone()) {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(table = self.table, error = %e, "Skipping undecodable row delete");
                return None;
            }
        };
        if self
            .scope
            .is_some_and(|scope| !scope.matches_refs(row.client_id, row.project_id, row.donor_move_id))
        {
            return None;
        }
        Some(TimelineUpdate::Removed {
            id: timeline_id(self.source, &row.id.to_string()),
            source: self.source,
        })
    }
}
