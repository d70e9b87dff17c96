use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::error::Result;

/// Configuration handed to the factory and to every adapter it builds
///
/// Unknown keys are ignored so a single mapping can carry options for
/// several backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Preferred handler name
    pub handler: Option<String>,
    /// Handler to try when the preferred one is unsupported
    #[serde(alias = "backupHandler")]
    pub backup_handler: Option<String>,
    /// Prepended to every key
    pub prefix: String,
    /// Address of the counter-style store
    pub host: String,
    pub port: u16,
    pub weight: u32,
    /// Store values without an envelope so they can be incremented
    pub raw: bool,
    pub redis: RedisOptions,
    pub shared: SharedOptions,
}

/// Options for the remote key-value adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisOptions {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Connection timeout in seconds, `0` waits indefinitely
    pub timeout: f64,
    pub database: i64,
}

/// Options for the process-wide user cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedOptions {
    pub enabled: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            handler: None,
            backup_handler: None,
            prefix: String::new(),
            host: "127.0.0.1".to_string(),
            port: 11211,
            weight: 1,
            raw: false,
            redis: RedisOptions::default(),
            shared: SharedOptions::default(),
        }
    }
}

impl Default for RedisOptions {
    fn default() -> Self {
        Self {
            scheme: "tcp".to_string(),
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            timeout: 0.0,
            database: 0,
        }
    }
}

impl Default for SharedOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BackendConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&content)?)
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn with_backup_handler(mut self, handler: impl Into<String>) -> Self {
        self.backup_handler = Some(handler.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Get store address
    pub fn store_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply the key prefix
    pub fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl RedisOptions {
    /// Connection timeout, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.timeout > 0.0).then(|| Duration::from_secs_f64(self.timeout))
    }
}
