//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the publish/subscribe hub for [`RowChange`]s. It is
//! shared via `Arc<ChangeBus>` between the NOTIFY relay, which publishes,
//! and the live timeline bridge, which subscribes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RowChange
// ---------------------------------------------------------------------------

/// Kind of row change, matching PostgreSQL `TG_OP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// A change to one row of a timeline table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowChange {
    /// Table name, e.g. `"activities"`.
    pub table: String,

    pub op: ChangeOp,

    /// The row as JSON. Deletes carry only the id and entity references.
    pub record: serde_json::Value,

    /// When the change was observed (UTC).
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

impl RowChange {
    pub fn new(table: impl Into<String>, op: ChangeOp, record: serde_json::Value) -> Self {
        Self {
            table: table.into(),
            op,
            record,
            observed_at: Utc::now(),
        }
    }

    /// Build a change from a serializable row model.
    pub fn from_row<T: Serialize>(
        table: impl Into<String>,
        op: ChangeOp,
        row: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(table, op, serde_json::to_value(row)?))
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for row changes.
///
/// # Usage
///
/// ```rust
/// use steward_events::bus::{ChangeBus, ChangeOp, RowChange};
///
/// let bus = ChangeBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RowChange::new("activities", ChangeOp::Insert, serde_json::json!({})));
/// ```
pub struct ChangeBus {
    sender: broadcast::Sender<RowChange>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    ///
    /// With no subscribers the change is silently dropped.
    pub fn publish(&self, change: RowChange) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RowChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
