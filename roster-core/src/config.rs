//! Configuration management for Roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PORT, DATABASE_URL, ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Requests running longer than this are cancelled
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Grace period for in-flight requests on shutdown
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: Config::default_database_path(),
            max_connections: 5,
        }
    }
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Fixed seed for reviewer selection; unset means OS entropy
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub assignment: AssignmentConfig,
}

/// Overrides taken from command line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Get the default database path (~/.cache/roster/roster.db)
    pub fn default_database_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roster")
            .join("roster.db")
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PORT: Port to listen on
    /// - DATABASE_URL: `sqlite://` URL or plain path of the database
    /// - ROSTER_HOST: Address to bind to
    /// - ROSTER_DATABASE_PATH: Path of the database (wins over DATABASE_URL)
    /// - ROSTER_SEED: Reviewer selection seed
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid PORT {:?}: {}", port, e)))?;
        }

        if let Some(url) = var("DATABASE_URL") {
            self.database.path = database_path_from_url(&url);
        }

        if let Some(path) = var("ROSTER_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(host) = var("ROSTER_HOST") {
            self.server.host = host;
        }

        if let Some(seed) = var("ROSTER_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| Error::Config(format!("Invalid ROSTER_SEED {:?}: {}", seed, e)))?;
            self.assignment.seed = Some(seed);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(path) = overrides.database {
            self.database.path = path;
        }

        if let Some(seed) = overrides.seed {
            self.assignment.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit `config_path`
    /// must exist.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(overrides))
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Strip the `sqlite:` scheme from a database URL
fn database_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}
