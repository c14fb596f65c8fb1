use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::repository::RepositoryConfig;
use crate::runner::DEFAULT_SHUTDOWN_TIMEOUT;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_STORAGE_PATH: &str = "./persistence";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown persistence type: {0}. Must be 'memory' or 'local'")]
    UnknownPersistence(String),

    #[error("Unable to read property file {path}: {source}")]
    PropertyFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Server configuration, built once at startup and handed to the parts that
/// need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub repository: RepositoryConfig,
    pub shutdown_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the environment, seeded from a `KEY=value`
    /// property file when one is given. Variables already set in the
    /// environment win over the file.
    pub fn load(property_file: Option<&Path>) -> Result<Self, ConfigError> {
        match property_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|source| ConfigError::PropertyFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "BIND_ADDRESS",
                value: bind_address.clone(),
                reason: e.to_string(),
            })?;

        let persistence = lookup("PERSISTENCE_TYPE").unwrap_or_else(|| "local".to_string());
        let repository = match persistence.as_str() {
            "memory" => RepositoryConfig::memory(),
            "local" | "json" => {
                let path =
                    lookup("STORAGE_PATH").unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string());
                RepositoryConfig::local(path)
            }
            _ => return Err(ConfigError::UnknownPersistence(persistence)),
        };

        let shutdown_timeout = match lookup("SHUTDOWN_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidValue {
                    key: "SHUTDOWN_TIMEOUT_SECS",
                    value: secs.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_SHUTDOWN_TIMEOUT,
        };

        Ok(Self {
            bind_address,
            repository,
            shutdown_timeout,
        })
    }
}
