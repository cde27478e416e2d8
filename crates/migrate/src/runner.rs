//! Batched upserts.
//!
//! Records are written in batches of `batch_size`; the upserts inside a batch
//! run concurrently and each one succeeds or fails on its own. Every upsert
//! is `ON CONFLICT (id) DO UPDATE`, so re-running a migration is safe.

use std::future::Future;

use anyhow::Context;
use futures::future::join_all;
use sqlx::PgPool;
use steward_core::types::DbId;
use steward_db::models::case::UpsertCase;
use steward_db::models::donation::UpsertDonation;
use steward_db::models::project::UpsertProject;
use steward_db::models::task::UpsertTask;
use steward_db::repositories::{CaseRepo, DonationRepo, ProjectRepo, TaskRepo};

use crate::dataset::{self, Dataset};

/// Records per batch when `--batch-size` is not given.
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct MigrateOptions {
    pub batch_size: usize,
    /// Parse and count only; nothing is written.
    pub dry_run: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

/// Outcome of migrating one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub dataset: Dataset,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// A seed record with a fixed primary key.
pub trait SeedRecord {
    fn id(&self) -> DbId;
}

impl SeedRecord for UpsertProject {
    fn id(&self) -> DbId {
        self.id
    }
}

impl SeedRecord for UpsertTask {
    fn id(&self) -> DbId {
        self.id
    }
}

impl SeedRecord for UpsertCase {
    fn id(&self) -> DbId {
        self.id
    }
}

impl SeedRecord for UpsertDonation {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Upsert `records` in batches, counting successes and failures.
///
/// A failing record is logged and counted; it never aborts the run.
pub async fn run_batches<'a, T, F, Fut>(
    dataset: Dataset,
    records: &'a [T],
    batch_size: usize,
    upsert: F,
) -> MigrationReport
where
    T: SeedRecord,
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<(), sqlx::Error>>,
{
    let mut report = MigrationReport {
        dataset,
        total: records.len(),
        succeeded: 0,
        failed: 0,
        dry_run: false,
    };

    for (index, batch) in records.chunks(batch_size.max(1)).enumerate() {
        let results = join_all(batch.iter().map(&upsert)).await;

        let mut batch_failed = 0;
        for (record, result) in batch.iter().zip(results) {
            if let Err(e) = result {
                batch_failed += 1;
                tracing::warn!(%dataset, id = record.id(), error = %e, "Record upsert failed");
            }
        }
        let batch_succeeded = batch.len() - batch_failed;
        report.succeeded += batch_succeeded;
        report.failed += batch_failed;

        tracing::info!(
            %dataset,
            batch = index + 1,
            succeeded = batch_succeeded,
            failed = batch_failed,
            "Batch complete"
        );
    }

    report
}

fn dry_run_report(dataset: Dataset, total: usize) -> MigrationReport {
    tracing::info!(%dataset, total, "Dry run, nothing written");
    MigrationReport {
        dataset,
        total,
        succeeded: 0,
        failed: 0,
        dry_run: true,
    }
}

/// Migrate `dataset` (or every dataset for [`Dataset::All`]).
///
/// `pool` may be `None` only for a dry run. Errors are fatal conditions:
/// an unparseable bundled dataset, a missing pool or a failed sequence
/// update. Per-record failures are reported, not returned.
pub async fn migrate(
    pool: Option<&PgPool>,
    dataset: Dataset,
    options: MigrateOptions,
) -> anyhow::Result<Vec<MigrationReport>> {
    let mut reports = Vec::new();
    for single in dataset.expand() {
        let report = migrate_one(pool, single, options).await?;
        tracing::info!(
            dataset = %report.dataset,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Dataset migrated"
        );
        reports.push(report);
    }
    Ok(reports)
}

async fn migrate_one(
    pool: Option<&PgPool>,
    dataset: Dataset,
    options: MigrateOptions,
) -> anyhow::Result<MigrationReport> {
    let batch_size = options.batch_size;
    let context = || format!("Bundled {dataset} dataset is invalid");

    match dataset {
        Dataset::Projects => {
            let records = dataset::projects().with_context(context)?;
            if options.dry_run {
                return Ok(dry_run_report(dataset, records.len()));
            }
            let pool = require_pool(pool)?;
            let report =
                run_batches(dataset, &records, batch_size, |r| ProjectRepo::upsert(pool, r)).await;
            ProjectRepo::sync_sequence(pool)
                .await
                .context("Failed to advance projects id sequence")?;
            Ok(report)
        }
        Dataset::Tasks => {
            let records = dataset::tasks().with_context(context)?;
            if options.dry_run {
                return Ok(dry_run_report(dataset, records.len()));
            }
            let pool = require_pool(pool)?;
            let report =
                run_batches(dataset, &records, batch_size, |r| TaskRepo::upsert(pool, r)).await;
            TaskRepo::sync_sequence(pool)
                .await
                .context("Failed to advance tasks id sequence")?;
            Ok(report)
        }
        Dataset::Cases => {
            let records = dataset::cases().with_context(context)?;
            if options.dry_run {
                return Ok(dry_run_report(dataset, records.len()));
            }
            let pool = require_pool(pool)?;
            let report =
                run_batches(dataset, &records, batch_size, |r| CaseRepo::upsert(pool, r)).await;
            CaseRepo::sync_sequence(pool)
                .await
                .context("Failed to advance cases id sequence")?;
            Ok(report)
        }
        Dataset::Donations => {
            let records = dataset::donations().with_context(context)?;
            if options.dry_run {
                return Ok(dry_run_report(dataset, records.len()));
            }
            let pool = require_pool(pool)?;
            let report =
                run_batches(dataset, &records, batch_size, |r| DonationRepo::upsert(pool, r))
                    .await;
            DonationRepo::sync_sequence(pool)
                .await
                .context("Failed to advance donations id sequence")?;
            Ok(report)
        }
        Dataset::All => anyhow::bail!("Dataset::All must be expanded before migrating"),
    }
}

fn require_pool(pool: Option<&PgPool>) -> anyhow::Result<&PgPool> {
    pool.context("A database connection is required unless --dry-run is set")
}
