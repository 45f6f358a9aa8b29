// src/config.rs

//! Client configuration: defaults, loading from TOML, and validation.

use crate::connection::{DEFAULT_READ_BUFFER_SIZE, DEFAULT_SHUTDOWN_GRACE};
use crate::core::protocol::DEFAULT_MAX_LINE_LENGTH;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// The file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "botlink.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Unset means the operating system decides when a connect attempt fails.
    #[serde(default, with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,

    /// How long `disconnect` waits for the listener to stop.
    #[serde(with = "humantime_serde", default = "default_shutdown_grace")]
    pub shutdown_grace: Duration,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Pause after connecting so the server's greeting prints before the prompt.
    #[serde(with = "humantime_serde", default = "default_welcome_delay")]
    pub welcome_delay: Duration,

    /// Pause after each command so an immediate reply prints before the next prompt.
    #[serde(with = "humantime_serde", default = "default_command_pause")]
    pub command_pause: Duration,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_shutdown_grace() -> Duration {
    DEFAULT_SHUTDOWN_GRACE
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

fn default_welcome_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_command_pause() -> Duration {
    Duration::from_millis(100)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            connect_timeout: None,
            shutdown_grace: default_shutdown_grace(),
            read_buffer_size: default_read_buffer_size(),
            max_line_length: default_max_line_length(),
            welcome_delay: default_welcome_delay(),
            command_pause: default_command_pause(),
        }
    }
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid configuration in '{}'", path.display()))
    }

    /// Parses and validates configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given. Otherwise loads [`DEFAULT_CONFIG_FILE`] when it
    /// exists, and falls back to the built-in defaults when it doesn't.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Checks the configuration for values the session cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.read_buffer_size == 0 {
            return Err(anyhow!("read_buffer_size cannot be 0"));
        }
        if self.max_line_length == 0 {
            return Err(anyhow!("max_line_length cannot be 0"));
        }
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err(anyhow!("connect_timeout cannot be 0; leave it unset to disable it"));
        }
        if self.max_line_length < self.read_buffer_size {
            warn!(
                "max_line_length ({}) is smaller than read_buffer_size ({}); long server lines will end the session.",
                self.max_line_length, self.read_buffer_size
            );
        }
        Ok(())
    }
}
