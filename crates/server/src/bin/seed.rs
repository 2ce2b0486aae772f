//! mimic-seed: one-shot database seeder.
//!
//! Recreates the synthetic dataset and exits non-zero on any failure.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mimic_server::config::SeedSettings;
use mimic_server::error::SeedError;
use mimic_server::{SeedSummary, Seeder};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    match run().await {
        Ok(summary) => {
            for (table, rows) in &summary.table_counts {
                tracing::info!(table = table.name(), rows, "Table populated");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SeedSummary, SeedError> {
    let settings = SeedSettings::from_env()?;
    let pool = mimic_server::db::create_pool(&settings.database_url).await?;
    Seeder::new(pool, settings).run().await
}
