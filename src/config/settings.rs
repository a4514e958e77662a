//! Application settings loaded from `config.toml` with environment overrides.
//!
//! Every section is optional in the file and falls back to a sensible default, so
//! an empty or missing `config.toml` still yields a runnable configuration. The
//! lookup tables (`[[store_statuses]]` and friends) are seeded into the database
//! at startup.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Full contents of `config.toml`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Square API settings
    pub square: SquareConfig,
    /// Where uploaded files are written
    pub storage: StorageConfig,
    /// List endpoint page sizes
    pub pagination: PaginationConfig,
    /// Rows seeded into `store_statuses`
    pub store_statuses: Vec<LookupConfig>,
    /// Rows seeded into `store_types`
    pub store_types: Vec<LookupConfig>,
    /// Rows seeded into `company_types`
    pub company_types: Vec<LookupConfig>,
    /// Rows seeded into `company_statuses`
    pub company_statuses: Vec<LookupConfig>,
}

/// `[server]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/foodfleet.sqlite?mode=rwc".to_string(),
        }
    }
}

/// Which Square host to talk to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SquareEnvironment {
    /// `connect.squareupsandbox.com`
    #[default]
    Sandbox,
    /// `connect.squareup.com`
    Production,
}

impl std::str::FromStr for SquareEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(Error::Config {
                message: format!("Unknown Square environment '{other}'"),
            }),
        }
    }
}

/// `[square]`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SquareConfig {
    /// Sandbox or production
    pub environment: SquareEnvironment,
    /// Overrides the API host, used to point at a local stub
    pub base_url: Option<String>,
}

/// `[storage]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for uploaded files
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
        }
    }
}

/// `[pagination]`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when `page[size]` is absent
    pub default_size: u64,
    /// Upper bound on `page[size]`
    pub max_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: 30,
            max_size: 100,
        }
    }
}

/// A seeded lookup row (`id`, `name`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LookupConfig {
    /// Fixed numeric id referenced by other rows
    pub id: i32,
    /// Display name
    pub name: String,
}

impl AppConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `Error::Config` if the TOML is malformed.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })
    }

    /// Applies `DATABASE_URL`, `BIND_ADDRESS` and `SQUARE_ENVIRONMENT` on top of
    /// the file values.
    ///
    /// # Errors
    /// Returns `Error::Config` if `SQUARE_ENVIRONMENT` holds an unknown value.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            debug!("DATABASE_URL overrides database.url");
            self.database.url = url;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            debug!("BIND_ADDRESS overrides server.bind_address");
            self.server.bind_address = addr;
        }
        if let Ok(env) = std::env::var("SQUARE_ENVIRONMENT") {
            self.square.environment = env.parse()?;
        }
        Ok(self)
    }
}

/// Loads `config.toml` from `path`, falling back to defaults when the file is
/// missing, then applies environment overrides.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed, or if an
/// environment override is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => {
            info!("Loaded configuration from {}", path.display());
            AppConfig::from_toml(&contents)?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, using default configuration", path.display());
            AppConfig::default()
        }
        Err(e) => {
            return Err(Error::Config {
                message: format!("Failed to read config file {}: {e}", path.display()),
            });
        }
    };
    config.apply_env()
}
