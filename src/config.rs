//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Result, RilError};
use crate::ril::protocol::DEFAULT_QAN_ELEMENTS;
use crate::ril::quirks::{EnvPropertyStore, FilePropertyStore, PropertyStore, QuirkConfig};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub modem: ModemConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Modem quirk overrides and response layout
#[derive(Debug, Deserialize, Clone)]
pub struct ModemConfig {
    /// Overrides `ro.ril.samsung_nextgen_modem` when set
    #[serde(default)]
    pub samsung_nextgen_modem: Option<bool>,

    /// Overrides `ro.ril.needs_videocall_field` when set
    #[serde(default)]
    pub needs_videocall_field: Option<bool>,

    #[serde(default = "default_qan_elements")]
    pub qan_elements: usize,

    /// `key=value` property file; the environment is used when unset
    #[serde(default)]
    pub property_file: Option<String>,
}

/// Modem daemon socket configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; empty logs to stderr only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_qan_elements() -> usize { DEFAULT_QAN_ELEMENTS }

fn default_socket_path() -> String { "/dev/socket/rild".to_string() }
fn default_reconnect_interval_ms() -> u64 { 4000 }
fn default_max_frame_bytes() -> usize { 8192 }

fn default_log_level() -> String { "info".to_string() }

/// Largest accepted `max_frame_bytes`
const MAX_FRAME_BYTES_LIMIT: usize = 1024 * 1024;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            samsung_nextgen_modem: None,
            needs_videocall_field: None,
            qan_elements: default_qan_elements(),
            property_file: None,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use exynos_ril::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve modem quirks
    ///
    /// An explicit `[modem]` value wins; otherwise the property store is
    /// consulted, defaulting to `false`.
    pub fn resolve_quirks<P: PropertyStore + ?Sized>(&self, props: &P) -> QuirkConfig {
        let from_props = QuirkConfig::from_properties(props);

        QuirkConfig {
            next_gen_call_details: self
                .modem
                .samsung_nextgen_modem
                .unwrap_or(from_props.next_gen_call_details),
            needs_video_call_field: self
                .modem
                .needs_videocall_field
                .unwrap_or(from_props.needs_video_call_field),
        }
    }

    /// Resolve modem quirks from the configured platform property source
    ///
    /// Reads `[modem] property_file` when set, otherwise `RO_RIL_*`
    /// environment variables.
    pub fn platform_quirks(&self) -> QuirkConfig {
        match &self.modem.property_file {
            Some(path) => self.resolve_quirks(&FilePropertyStore::load(path)),
            None => self.resolve_quirks(&EnvPropertyStore),
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.modem.qan_elements < DEFAULT_QAN_ELEMENTS {
            return Err(RilError::Config(
                toml::de::Error::custom(format!("qan_elements must be at least {}", DEFAULT_QAN_ELEMENTS))
            ));
        }

        if self.modem.property_file.as_deref() == Some("") {
            return Err(RilError::Config(
                toml::de::Error::custom("property_file cannot be empty when set")
            ));
        }

        if self.transport.socket_path.is_empty() {
            return Err(RilError::Config(
                toml::de::Error::custom("socket_path cannot be empty")
            ));
        }

        if self.transport.reconnect_interval_ms == 0 || self.transport.reconnect_interval_ms > 60000 {
            return Err(RilError::Config(
                toml::de::Error::custom("reconnect_interval_ms must be between 1 and 60000")
            ));
        }

        if self.transport.max_frame_bytes < 16 || self.transport.max_frame_bytes > MAX_FRAME_BYTES_LIMIT {
            return Err(RilError::Config(
                toml::de::Error::custom(format!("max_frame_bytes must be between 16 and {}", MAX_FRAME_BYTES_LIMIT))
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(RilError::Config(
                toml::de::Error::custom("log level must be one of: trace, debug, info, warn, error")
            ));
        }

        Ok(())
    }
}
