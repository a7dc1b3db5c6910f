//! Serve command: run the HTTP API

use std::sync::Arc;

use clap::Args;
use roster_core::{Config, InMemoryStore, ReviewService, RngSource};
use roster_db::Database;
use roster_server::AppState;

/// Run the HTTP API
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Keep all state in memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let rng = RngSource::from_seed(config.assignment.seed);
        if let Some(seed) = config.assignment.seed {
            tracing::info!(seed, "Reviewer selection is seeded");
        }

        if self.in_memory {
            tracing::warn!("Using in-memory store, state is lost on exit");
            let service =
                ReviewService::from_store(Arc::new(InMemoryStore::new())).with_rng_source(rng);
            return roster_server::serve(AppState::new(service), &config.server).await;
        }

        let db = Database::connect(config.database.clone().into()).await?;
        db.migrate().await?;

        let service = ReviewService::new(
            Arc::new(db.teams()),
            Arc::new(db.users()),
            Arc::new(db.pull_requests()),
        )
        .with_rng_source(rng);

        let result = roster_server::serve(AppState::new(service), &config.server).await;
        db.close().await;
        result
    }
}
