/// Database connection, table creation and additive migrations
pub mod database;

/// `config.toml` loading with environment overrides
pub mod settings;

pub use settings::{AppConfig, load_config};
