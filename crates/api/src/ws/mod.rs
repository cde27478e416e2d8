//! WebSocket endpoints.

pub mod live;

pub use live::{live_timeline_ws, LiveMessage};
