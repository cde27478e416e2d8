//! One-shot data migration for Steward.
//!
//! - [`dataset`]: the bundled seed datasets and their loaders.
//! - [`runner`]: batched, idempotent upserts with per-batch accounting.

pub mod dataset;
pub mod runner;

pub use dataset::Dataset;
pub use runner::{migrate, run_batches, MigrateOptions, MigrationReport, DEFAULT_BATCH_SIZE};
