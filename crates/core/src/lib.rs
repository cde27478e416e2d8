//! Steward domain core.
//!
//! Zero-I/O types shared by the database, timeline, integration and API
//! crates: identifiers, timestamps, the domain error type and the
//! relationship timeline model.

pub mod display;
pub mod error;
pub mod timeline;
pub mod types;
