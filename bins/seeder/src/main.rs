//! Database seeder for development and testing.
//!
//! Inserts the baseline transaction set into an empty remote table. The
//! database assigns `FT` ids, so the seeded rows do not reuse the local
//! `TRX` ids of the cache baseline.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_core::finance::{
    DateNormalizer, NewTransaction, RemoteStore, Transaction, seed,
};
use vitrine_db::TransactionRepository;
use vitrine_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let normalizer = DateNormalizer::from_offset_minutes(config.business.utc_offset_minutes)
        .context("business.utc_offset_minutes is out of range")?;

    let db = vitrine_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let repo = TransactionRepository::new(db, normalizer)
        .with_insert_procedure(config.remote.use_insert_procedure);

    let existing = repo.list_all().await?;
    if !existing.is_empty() {
        info!(count = existing.len(), "Transactions already present, skipping seed");
        return Ok(());
    }

    for tx in seed::baseline() {
        let inserted = repo.insert(&as_new(tx)).await?;
        info!(id = %inserted.id, description = %inserted.description, "Seeded transaction");
    }

    info!("Seeding complete");
    Ok(())
}

fn as_new(tx: Transaction) -> NewTransaction {
    NewTransaction {
        description: tx.description,
        amount: tx.amount,
        transaction_type: tx.transaction_type,
        category: tx.category,
        status: tx.status,
        transaction_date: tx.transaction_date,
        due_date: tx.due_date,
        payment_date: tx.payment_date,
        payment_method: tx.payment_method,
        notes: tx.notes,
        linked_entity_id: tx.linked_entity_id,
        linked_entity_type: tx.linked_entity_type,
        receipt_url: tx.receipt_url,
        related_sale_link: tx.related_sale_link,
    }
}
