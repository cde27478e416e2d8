//! Live timeline over WebSocket.
//!
//! The client connects with `?entity_type=&entity_id=` and receives one
//! JSON message per change to that entity's timeline:
//!
//! ```text
//! {"type": "timeline.upsert", "event": { ... }}
//! {"type": "timeline.removed", "id": "activity-42", "source": "activity"}
//! ```
//!
//! Nothing is replayed on connect; the client loads pages over HTTP and
//! merges these messages into what it already shows.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use steward_core::timeline::{EntityType, EventSource, UnifiedTimelineEvent};
use steward_timeline::{LiveUpdates, TimelineUpdate};
use tokio::sync::mpsc;

use crate::error::AppResult;
use crate::query::EntityParams;
use crate::state::AppState;

/// Outbound message on the live timeline socket.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum LiveMessage<'a> {
    #[serde(rename = "timeline.upsert")]
    Upsert { event: &'a UnifiedTimelineEvent },
    #[serde(rename = "timeline.removed")]
    Removed { id: &'a str, source: EventSource },
}

impl<'a> From<&'a TimelineUpdate> for LiveMessage<'a> {
    fn from(update: &'a TimelineUpdate) -> Self {
        match update {
            TimelineUpdate::Upsert(event) => LiveMessage::Upsert { event },
            TimelineUpdate::Removed { id, source } => LiveMessage::Removed {
                id,
                source: *source,
            },
        }
    }
}

/// HTTP handler that upgrades the connection to a live timeline socket.
///
/// The entity is validated before the upgrade so a bad id is a plain `400`.
pub async fn live_timeline_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<EntityParams>,
) -> AppResult<impl IntoResponse> {
    let filters = params.filters()?;
    filters.entity_scope()?;

    let entity_type = filters.entity_type;
    let entity_id = filters.entity_id;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, entity_type, entity_id)))
}

/// Manage one live connection after upgrade.
///
/// Subscribes to the change bus, forwards updates to the socket from a
/// spawned sender task and drains inbound frames until the client leaves.
async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    entity_type: EntityType,
    entity_id: String,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::unbounded_channel::<TimelineUpdate>();
    let on_update = move |update| {
        let _ = tx.send(update);
    };
    let subscription = match LiveUpdates::subscribe(&state.change_bus, entity_type, &entity_id, on_update) {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Live timeline subscription rejected");
            return;
        }
    };
    tracing::info!(conn_id = %conn_id, entity_id = %entity_id, "Live timeline connected");

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward timeline updates to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let text = match serde_json::to_string(&LiveMessage::from(&update)) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(conn_id = %sender_conn_id, error = %e, "Dropping unserializable update");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: the client only ever closes or pings.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    subscription.unsubscribe().await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Live timeline disconnected");
}
