//! Service configuration
//!
//! Resolution order, later layers winning:
//! 1. built-in defaults
//! 2. JSON config file (`--config`)
//! 3. environment variables and command-line flags
//!
//! A missing store connection string after all layers is fatal.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::args::{ConfigArgs, Environment};
use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::observability::DEFAULT_LOG_FILTER;
use crate::storage::{StoreConfig, StoreTarget};

/// Effective service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Store connection string (required)
    #[serde(default)]
    pub store_uri: Option<String>,

    /// Host to bind to (default "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default 3040)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origins (default ["http://localhost:3000"])
    #[serde(default = "default_frontend_urls")]
    pub frontend_urls: Vec<String>,

    #[serde(default)]
    pub environment: Environment,

    /// Per-operation store timeout (default 5000ms)
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Delay between store connection attempts (default 5000ms)
    #[serde(default = "default_store_reconnect_ms")]
    pub store_reconnect_ms: u64,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3040
}
fn default_frontend_urls() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}
fn default_store_timeout_ms() -> u64 {
    5000
}
fn default_store_reconnect_ms() -> u64 {
    5000
}
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_uri: None,
            host: default_host(),
            port: default_port(),
            frontend_urls: default_frontend_urls(),
            environment: Environment::default(),
            store_timeout_ms: default_store_timeout_ms(),
            store_reconnect_ms: default_store_reconnect_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Resolves every layer and validates the result.
    pub fn resolve(args: &ConfigArgs) -> CliResult<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        let config = base.overlay(args);
        config.validate()?;
        Ok(config)
    }

    /// Applies flag/environment overrides.
    pub fn overlay(mut self, args: &ConfigArgs) -> Self {
        if let Some(uri) = &args.store_uri {
            self.store_uri = Some(uri.clone());
        }
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(urls) = &args.frontend_urls {
            self.frontend_urls = urls
                .iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect();
        }
        if let Some(environment) = args.environment {
            self.environment = environment;
        }
        if let Some(ms) = args.store_timeout_ms {
            self.store_timeout_ms = ms;
        }
        if let Some(ms) = args.store_reconnect_ms {
            self.store_reconnect_ms = ms;
        }
        if let Some(filter) = &args.log_filter {
            self.log_filter = filter.clone();
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        self.store_target()?;

        if self.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }

        if self.store_timeout_ms == 0 {
            return Err(CliError::config_error("store_timeout_ms must be > 0"));
        }

        if self.store_reconnect_ms == 0 {
            return Err(CliError::config_error("store_reconnect_ms must be > 0"));
        }

        for url in &self.frontend_urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CliError::config_error(format!(
                    "Invalid frontend URL: '{}'. Must start with http:// or https://",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Parsed store location
    pub fn store_target(&self) -> CliResult<StoreTarget> {
        let uri = self
            .store_uri
            .as_deref()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| CliError::config_error("Store connection string is missing (STORE_URI)"))?;

        StoreTarget::parse(uri)
            .map_err(|e| CliError::config_error(format!("Invalid STORE_URI: {}", e)))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            reconnect_delay: Duration::from_millis(self.store_reconnect_ms),
            operation_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }

    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.frontend_urls.clone(),
            expose_errors: !self.is_production(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
