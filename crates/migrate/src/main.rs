//! `steward-migrate` -- upsert the bundled CRM datasets into PostgreSQL.
//!
//! ```text
//! steward-migrate <projects|tasks|cases|donations|all> [--batch-size N] [--dry-run]
//! ```
//!
//! # Environment variables
//!
//! | Variable       | Required              | Description                      |
//! |----------------|-----------------------|----------------------------------|
//! | `DATABASE_URL` | unless `--dry-run`    | Overridden by `--database-url`   |
//!
//! # Exit status
//!
//! `0` when every record was written, `2` when some records failed, `1` on
//! fatal errors (connection, schema migration, invalid bundled data).

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use steward_migrate::{migrate, Dataset, MigrateOptions, MigrationReport, DEFAULT_BATCH_SIZE};

/// Exit status when the run finished but some records failed.
const PARTIAL_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "steward-migrate", version, about = "Upsert bundled CRM datasets into PostgreSQL")]
struct Cli {
    /// Dataset to migrate.
    #[arg(value_enum)]
    dataset: Dataset,

    /// Records upserted concurrently per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Parse and count the records without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Database URL. Defaults to `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steward_migrate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(reports) if reports.iter().any(MigrationReport::has_failures) => {
            tracing::warn!("Migration finished with failed records");
            ExitCode::from(PARTIAL_FAILURE)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Migration aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Vec<MigrationReport>> {
    anyhow::ensure!(cli.batch_size > 0, "--batch-size must be at least 1");

    let options = MigrateOptions {
        batch_size: cli.batch_size,
        dry_run: cli.dry_run,
    };
    tracing::info!(
        dataset = %cli.dataset,
        batch_size = options.batch_size,
        dry_run = options.dry_run,
        "Starting migration"
    );

    if options.dry_run {
        return migrate(None, cli.dataset, options).await;
    }

    let database_url = match cli.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };
    let pool = steward_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    steward_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let reports = migrate(Some(&pool), cli.dataset, options).await?;

    let (succeeded, failed) = reports
        .iter()
        .fold((0, 0), |(s, f), r| (s + r.succeeded, f + r.failed));
    tracing::info!(datasets = reports.len(), succeeded, failed, "Migration complete");

    Ok(reports)
}
