//! Configuration loading and typed config structures for the node.
//!
//! The configuration lives in `overwatch-config.yaml` (or the file named by
//! `OVERWATCH_CONFIG`). Every field has a default, so an empty or missing
//! file yields a working node pointed at localhost.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Config file read when `OVERWATCH_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "overwatch-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level node configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeConfig {
    /// Tactical server endpoints.
    #[serde(default)]
    pub server: ServerEndpoints,

    /// Live event feed.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Picture tunables.
    #[serde(default)]
    pub picture: PictureConfig,

    /// Observer API server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Load from `OVERWATCH_CONFIG`, else [`DEFAULT_CONFIG_PATH`].
    ///
    /// A missing file yields the defaults. Environment overrides are
    /// applied either way.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("OVERWATCH_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let path = Path::new(&path);
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// - `NATS_URL` overrides `feed.nats_url`
    /// - `OVERWATCH_SNAPSHOT_URL` overrides `server.snapshot_url`
    /// - `OVERWATCH_COT_URL` overrides `server.cot_url`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, without environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NATS_URL") {
            self.feed.nats_url = val;
        }
        if let Ok(val) = std::env::var("OVERWATCH_SNAPSHOT_URL") {
            self.server.snapshot_url = Some(val);
        }
        if let Ok(val) = std::env::var("OVERWATCH_COT_URL") {
            self.server.cot_url = Some(val);
        }
    }
}

/// Tactical server endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerEndpoints {
    /// Map-state snapshot URL; `null` starts from an empty picture.
    #[serde(default = "default_snapshot_url")]
    pub snapshot_url: Option<String>,

    /// CoT transmission URL; `null` disables transmission.
    #[serde(default = "default_cot_url")]
    pub cot_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerEndpoints {
    /// Request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerEndpoints {
    fn default() -> Self {
        Self {
            snapshot_url: default_snapshot_url(),
            cot_url: default_cot_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Live event feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Subject prefix; events arrive on `{prefix}.{kind}`.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Capacity of the channel between the feed and the reconciliation
    /// loop.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            subject_prefix: default_subject_prefix(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Picture tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PictureConfig {
    /// Length of field-of-view cone edges in metres.
    #[serde(default = "default_fov_range_m")]
    pub fov_range_m: f64,
}

impl Default for PictureConfig {
    fn default() -> Self {
        Self {
            fov_range_m: default_fov_range_m(),
        }
    }
}

/// Observer API server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the observer.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind host.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[allow(clippy::unnecessary_wraps)]
fn default_snapshot_url() -> Option<String> {
    Some("http://localhost:8081/api/map_state".to_owned())
}

#[allow(clippy::unnecessary_wraps)]
fn default_cot_url() -> Option<String> {
    Some("http://localhost:8081/api/cot".to_owned())
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_subject_prefix() -> String {
    "overwatch.live".to_owned()
}

const fn default_channel_capacity() -> usize {
    1024
}

const fn default_fov_range_m() -> f64 {
    overwatch_sync::DEFAULT_FOV_RANGE_M
}

const fn default_true() -> bool {
    true
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
