//! Roster CLI - Team roster and pull request reviewer assignment service

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{MigrateArgs, ServeArgs};

/// Roster: assigns pull request reviewers from team rosters
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/roster/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and env)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Seed for reviewer selection (overrides config and env)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API (default)
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        CliOverrides {
            port: cli.port,
            database: cli.database.clone(),
            seed: cli.seed,
        },
    )?;

    if cli.verbose {
        tracing::debug!(
            addr = %config.bind_address(),
            database = %config.database.path.display(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Serve(args)) => args.execute(&config).await?,
        None => ServeArgs::default().execute(&config).await?,
        Some(Commands::Migrate(args)) => args.execute(&config).await?,
        Some(Commands::Config) => print_config(&config, cli.config.as_deref()),
        Some(Commands::Version) => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("Roster Configuration");
    println!("====================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.bind_address());
    println!("  request_timeout: {:?}", config.server.request_timeout);
    println!("  shutdown_timeout: {:?}", config.server.shutdown_timeout);
    println!();
    println!("Database:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!();
    println!("Assignment:");
    match config.assignment.seed {
        Some(seed) => println!("  seed: {}", seed),
        None => println!("  seed: (entropy)"),
    }
    println!();

    let path = explicit
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
