//! Steward row-change bus.
//!
//! - [`ChangeBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RowChange`]: one insert/update/delete on a timeline table.
//! - [`NotifyRelay`]: background service that turns PostgreSQL
//!   `NOTIFY timeline_changes` payloads into full row changes on the bus.

pub mod bus;
pub mod relay;

pub use bus::{ChangeBus, ChangeOp, RowChange};
pub use relay::{NotifyRelay, RelayError, NOTIFY_CHANNEL};
