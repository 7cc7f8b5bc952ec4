//! mongoref.toml configuration handling
//!
//! Precedence: command-line flag, then environment (`MONGOREF_URI`,
//! `MONGOREF_DATABASE`), then the config file, then built-in defaults.

use anyhow::{Context, Result};
use mongoref_mongodb::PoolConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "i18nMgr";

pub const URI_ENV: &str = "MONGOREF_URI";
pub const DATABASE_ENV: &str = "MONGOREF_DATABASE";

/// Pool settings as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pool_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_idle_time_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_selection_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl PoolSettings {
    /// Driver pool config; unset fields keep the library defaults
    pub fn to_pool_config(&self) -> PoolConfig {
        let defaults = PoolConfig::default();
        PoolConfig {
            min_pool_size: self.min_pool_size.or(defaults.min_pool_size),
            max_pool_size: self.max_pool_size.or(defaults.max_pool_size),
            max_idle_time: self
                .max_idle_time_secs
                .map(Duration::from_secs)
                .or(defaults.max_idle_time),
            connect_timeout: self
                .connect_timeout_secs
                .map(Duration::from_secs)
                .or(defaults.connect_timeout),
            server_selection_timeout: self
                .server_selection_timeout_secs
                .map(Duration::from_secs)
                .or(defaults.server_selection_timeout),
            app_name: self.app_name.clone().or(defaults.app_name),
        }
    }
}

/// Contents of mongoref.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MongoRefConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub pool: PoolSettings,
}

impl MongoRefConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse mongoref config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub uri: Option<String>,
    pub database: Option<String>,
}

/// Final connection settings after applying precedence
#[derive(Debug, Clone)]
pub struct Settings {
    pub uri: String,
    pub database: String,
    pub pool: PoolConfig,
}

impl Settings {
    pub fn resolve(
        file: MongoRefConfig,
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let uri = overrides
            .uri
            .or_else(|| env(URI_ENV))
            .or(file.uri)
            .unwrap_or_else(|| DEFAULT_URI.to_string());
        let database = overrides
            .database
            .or_else(|| env(DATABASE_ENV))
            .or(file.database)
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Self {
            uri,
            database,
            pool: file.pool.to_pool_config(),
        }
    }
}
