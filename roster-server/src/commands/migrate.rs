//! Migrate command: bring the database schema up to date

use clap::Args;
use roster_core::Config;
use roster_db::Database;

/// Run database migrations and exit
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = Database::connect(config.database.clone().into()).await?;
        db.migrate().await?;
        db.close().await;

        println!("Database is up to date: {}", config.database.path.display());
        Ok(())
    }
}
