//! Database migration runner.
//!
//! Connects with the same configuration as the `finance` binary, so
//! `config/*.toml` and `VITRINE__DATABASE__URL` apply here too.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_db::migration::Migrator;
use vitrine_shared::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "migrator")]
#[command(about = "Schema migrations for the financial transaction table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Action {
    /// Apply pending migrations (the default)
    Up {
        /// Only apply this many
        #[arg(short = 'n', long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: u32,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and apply all migrations again
    Fresh,
    /// Roll back all migrations and apply them again
    Refresh,
    /// Roll back all migrations
    Reset,
}

impl Action {
    async fn run(self, db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
        match self {
            Self::Up { steps } => Migrator::up(db, steps).await,
            Self::Down { steps } => Migrator::down(db, Some(steps)).await,
            Self::Status => Migrator::status(db).await,
            Self::Fresh => Migrator::fresh(db).await,
            Self::Refresh => Migrator::refresh(db).await,
            Self::Reset => Migrator::reset(db).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,migrator=info,sea_orm_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let action = Cli::parse().command.unwrap_or(Action::Up { steps: None });

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = vitrine_db::connect(&config.database)
        .await
        .context("invalid database configuration")?;

    action
        .run(&db)
        .await
        .with_context(|| format!("migration {action:?} failed"))?;
    info!(?action, "Migration finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn action(args: &[&str]) -> Option<Action> {
        Cli::try_parse_from(std::iter::once("migrator").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&["up"], Some(Action::Up { steps: None }))]
    #[case(&["up", "-n", "2"], Some(Action::Up { steps: Some(2) }))]
    #[case(&["down"], Some(Action::Down { steps: 1 }))]
    #[case(&["down", "--steps", "3"], Some(Action::Down { steps: 3 }))]
    #[case(&["status"], Some(Action::Status))]
    #[case(&["fresh"], Some(Action::Fresh))]
    fn test_parse_action(#[case] args: &[&str], #[case] expected: Option<Action>) {
        assert_eq!(action(args), expected);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(Cli::try_parse_from(["migrator", "generate"]).is_err());
    }
}
