//! Row models and DTOs, one module per table family.

pub mod activity;
pub mod case;
pub mod donation;
pub mod project;
pub mod sync_log;
pub mod task;
pub mod touchpoint;
