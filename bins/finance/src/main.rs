//! Financial transaction store command line.
//!
//! Reads go to PostgreSQL first and fall back to the local JSON cache when the
//! database fails or times out. Every result is printed as JSON together with
//! the path that served it.

mod cli;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_core::finance::{
    DateNormalizer, FsSnapshotStore, LocalCache, Served, TransactionStore,
};
use vitrine_db::TransactionRepository;
use vitrine_shared::AppConfig;

use cli::{Cli, Command, transaction_id};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=debug,finance=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    let normalizer = DateNormalizer::from_offset_minutes(config.business.utc_offset_minutes)
        .context("business.utc_offset_minutes is out of range")?;

    let db = vitrine_db::connect(&config.database)
        .await
        .context("invalid database configuration")?;
    let repo = TransactionRepository::new(db, normalizer)
        .with_insert_procedure(config.remote.use_insert_procedure);

    let snapshots = FsSnapshotStore::new(&config.cache.dir);
    debug!(path = %snapshots.path_for(&config.cache.storage_key).display(), "Opening local cache");
    let cache = LocalCache::open(snapshots, config.cache.storage_key.clone())
        .context("failed to open local cache")?;

    let store = TransactionStore::new(repo, cache)
        .with_timeout(Duration::from_millis(config.remote.timeout_ms))
        .with_normalizer(normalizer);

    run(&store, cli.command).await
}

async fn run(store: &TransactionStore<TransactionRepository>, command: Command) -> anyhow::Result<()> {
    let normalizer = *store.normalizer();

    match command {
        Command::List(args) => {
            let (filter, page) = args.to_query(&normalizer)?;
            print(&store.list(&filter, page).await?)
        }
        Command::Show { id } => print(&store.get_by_id(&transaction_id(&id)).await?),
        Command::Create(args) => {
            let created = store.create(&args.to_draft(&normalizer)?).await?;
            info!(id = %created.value.id, source = ?created.source, "Transaction created");
            print(&created)
        }
        Command::Update { id, fields } => {
            let patch = fields.to_patch(&normalizer)?;
            print(&store.update(&transaction_id(&id), &patch).await?)
        }
        Command::Confirm { id, date } => {
            let date = date.map(|d| cli::parse_date(&normalizer, &d)).transpose()?;
            print(&store.confirm_payment(&transaction_id(&id), date).await?)
        }
        Command::Cancel { id } => print(&store.cancel(&transaction_id(&id)).await?),
        Command::Delete { id } => print(&store.delete(&transaction_id(&id)).await?),
        Command::Summary(range) => print(&store.summarize(range.to_range(&normalizer)?).await?),
        Command::Refresh => {
            let refreshed = store.refresh().await?;
            info!(count = refreshed.value, source = ?refreshed.source, "Cache refresh finished");
            print(&refreshed)
        }
    }
}

fn print<T: Serialize>(served: &Served<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(served)?);
    Ok(())
}
