use crate::core::{AppError, Result};
use std::env;

pub mod database;
pub mod reports;
pub mod server;

pub use database::DatabaseConfig;
pub use reports::{CacheTtlConfig, ReportsConfig};
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Emit logs as JSON lines instead of the human-readable format
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                json_logs: env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            reports: ReportsConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size > self.database.max_connections {
            return Err(AppError::Configuration(
                "DATABASE_POOL_SIZE cannot exceed DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        self.reports.validate()
    }
}
