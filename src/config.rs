//! Configuration management for the scrypt stratum miner
//!
//! Supports configuration via command line arguments, environment variables
//! (`POOL_HOST`, `POOL_PORT`, `USERNAME`, `PASSWORD`) and an optional
//! configuration file (YAML or JSON). The pool settings are validated once
//! and frozen into a [`PoolConfig`] before any connection is made.

use crate::worker::DEFAULT_REPORT_INTERVAL;
use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Pool connection settings, immutable once built
#[derive(Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl PoolConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Complete configuration for the mining client
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "scrypt-stratum-miner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scrypt Stratum Mining Client",
    long_about = "A stratum mining client for scrypt-based pools. The currency symbol selects the miner implementation."
)]
pub struct Config {
    /// Currency symbol to mine (e.g. ltc)
    #[arg(default_value = "ltc")]
    #[serde(default = "default_currency")]
    pub currency: String,

    /// List supported currency symbols and exit
    #[arg(long)]
    #[serde(default)]
    pub list_currencies: bool,

    /// Print the parsed configuration and exit
    #[arg(long)]
    #[serde(default)]
    pub print_config: bool,

    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    #[serde(default)]
    pub config_file: Option<PathBuf>,

    /// Pool host name or address
    #[arg(long, env = "POOL_HOST")]
    #[serde(default)]
    pub pool_host: Option<String>,

    /// Pool port
    #[arg(long, env = "POOL_PORT")]
    #[serde(default)]
    pub pool_port: Option<u16>,

    /// Worker user name sent with mining.authorize and mining.submit
    #[arg(short = 'u', long, env = "USERNAME")]
    #[serde(default)]
    pub username: Option<String>,

    /// Worker password sent with mining.authorize
    #[arg(short = 'p', long, env = "PASSWORD", hide_env_values = true)]
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Log level
    #[arg(short = 'l', long, default_value = "info")]
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Hashes between hash rate reports
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}

impl Config {
    /// Parse the command line and merge the configuration file if given
    ///
    /// A `.env` file in the working directory (or a parent) is read first;
    /// variables already set in the environment are left untouched.
    pub async fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::parse();

        if let Some(config_file) = &config.config_file {
            let file_config = Self::load_from_file(config_file).await?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    async fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Merge CLI config with file config (CLI and environment take precedence)
    fn merge_with_file(mut self, file_config: Self) -> Self {
        if self.pool_host.is_none() {
            self.pool_host = file_config.pool_host;
        }
        if self.pool_port.is_none() {
            self.pool_port = file_config.pool_port;
        }
        if self.username.is_none() {
            self.username = file_config.username;
        }
        if self.password.is_none() {
            self.password = file_config.password;
        }

        // Remaining fields always carry CLI values (defaults included)
        self
    }

    /// Validate settings that do not depend on the pool
    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(Error::config("Currency symbol must not be empty"));
        }

        if self.report_interval == 0 {
            return Err(Error::config("Report interval must be greater than 0"));
        }

        Ok(())
    }

    /// Build the immutable pool settings, failing on missing credentials
    pub fn pool_config(&self) -> Result<PoolConfig> {
        let host = required(&self.pool_host, "POOL_HOST")?;
        let port = self
            .pool_port
            .ok_or_else(|| Error::config("POOL_PORT is required"))?;
        if port == 0 {
            return Err(Error::config("POOL_PORT must be between 1 and 65535"));
        }
        let username = required(&self.username, "USERNAME")?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| Error::config("PASSWORD is required"))?;

        Ok(PoolConfig::new(host, port, username, password))
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(_) => Err(Error::config(format!("{} must not be empty", name))),
        None => Err(Error::config(format!("{} is required", name))),
    }
}

// Default value functions for serde
fn default_currency() -> String { "ltc".to_string() }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_report_interval() -> u64 { DEFAULT_REPORT_INTERVAL }
