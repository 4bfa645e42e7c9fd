//! Configuration management for the MADUREX server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MADUREX_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Plant and detection store configuration
    pub store: StoreConfig,

    /// QR image generation configuration
    pub qr: QrConfig,

    /// Dashboard configuration
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which store implementation serves plants and detections
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST endpoint
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// In-process store
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Base URL of the hosted store (rest backend)
    #[serde(default)]
    pub url: String,

    /// Public anon key sent with every request (rest backend)
    #[serde(default)]
    pub anon_key: String,

    /// PostgreSQL connection URL (postgres backend)
    #[serde(default)]
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Request / acquire timeout in seconds
    pub timeout_secs: u64,

    /// JSON file with demo plants and detections (memory backend)
    #[serde(default)]
    pub seed_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QrConfig {
    /// Image generation endpoint
    pub endpoint: String,

    /// Edge length of the generated image in pixels
    pub size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Rows in the latest detections table
    pub recent_limit: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MADUREX_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "rest")?
            .set_default("store.max_connections", 10)?
            .set_default("store.min_connections", 2)?
            .set_default("store.timeout_secs", 30)?
            .set_default("qr.endpoint", shared::DEFAULT_QR_ENDPOINT)?
            .set_default("qr.size", i64::from(shared::DEFAULT_QR_SIZE))?
            .set_default("dashboard.recent_limit", shared::DEFAULT_RECENT_LIMIT as i64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MADUREX_ prefix)
            .add_source(
                Environment::with_prefix("MADUREX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check that the selected store backend has what it needs to connect
    pub fn validate(&self) -> Result<(), String> {
        match self.store.backend {
            StoreBackend::Rest if self.store.url.is_empty() || self.store.anon_key.is_empty() => {
                Err("store.url and store.anon_key are required for the rest backend".to_string())
            }
            StoreBackend::Postgres if self.store.database_url.is_empty() => {
                Err("store.database_url is required for the postgres backend".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                anon_key: String::new(),
                database_url: String::new(),
                max_connections: 10,
                min_connections: 2,
                timeout_secs: 30,
                seed_file: None,
            },
            qr: QrConfig {
                endpoint: shared::DEFAULT_QR_ENDPOINT.to_string(),
                size: shared::DEFAULT_QR_SIZE,
            },
            dashboard: DashboardConfig {
                recent_limit: shared::DEFAULT_RECENT_LIMIT,
            },
        }
    }
}
