//! Configuration module for oplk-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables. Secrets (the database URL and the gateway
//! service secret) come from the environment when not present in the file.

pub mod file;

pub use file::{FileConfig, StoreBackend};

use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the gateway basic-auth password.
const SERVICE_SECRET_ENV: &str = "PAYNL_SERVICE_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("gateway service secret not set (config `gateway.service_secret` or {SERVICE_SECRET_ENV})")]
    MissingServiceSecret,

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Resolve the gateway secret from the environment if needed
    /// 4. Validate the result
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            config.server.listen = listen;
        }

        if config.gateway.service_secret.is_none() {
            config.gateway.service_secret = std::env::var(SERVICE_SECRET_ENV).ok();
        }

        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.gateway.service_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.service_id must not be empty".to_string(),
        ));
    }
    if config.gateway.service_secret.is_none() {
        return Err(ConfigError::MissingServiceSecret);
    }
    let currency = &config.gateway.currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::Validation(format!(
            "gateway.currency must be a 3-letter uppercase code, got {currency:?}"
        )));
    }
    if config.gateway.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
