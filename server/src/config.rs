//! Configuration module
//!
//! Loads the server configuration from a JSON file, adding any keys the file
//! is missing with their default values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wire::Limits;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config root in {0} is not a JSON object")]
    NotAnObject(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Interface to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Name the server presents itself with
    pub server_name: String,
    /// Public URL of the server
    pub server_url: String,
    /// Number of peers tracked in the traffic cache
    pub cache_capacity: usize,
    /// Largest payload a single packet may announce
    pub max_payload_bytes: usize,
    /// Most bytes buffered per connection while waiting for a packet
    pub max_buffered_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 7654,
            server_name: "Bancho".to_string(),
            server_url: "http://localhost:7654".to_string(),
            cache_capacity: 1024,
            max_payload_bytes: limits.max_payload_bytes,
            max_buffered_bytes: limits.max_buffered_bytes,
        }
    }
}

impl Config {
    /// Every key of the JSON file, in file order.
    pub const KEYS: &'static [&'static str] = &[
        "host",
        "port",
        "server_name",
        "server_url",
        "cache_capacity",
        "max_payload_bytes",
        "max_buffered_bytes",
    ];

    /// Address the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Framing limits applied to every connection
    pub const fn limits(&self) -> Limits {
        Limits {
            max_payload_bytes: self.max_payload_bytes,
            max_buffered_bytes: self.max_buffered_bytes,
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let value = serde_json::to_value(self)?;
        write_json(path, &value)
    }
}

/// Result of [`load_or_init`].
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// The loaded configuration.
    pub config: Config,
    /// Keys that were missing from the file and have been written with
    /// their defaults.
    pub added_keys: Vec<String>,
}

impl ConfigLoad {
    /// Returns `true` if the file on disk was changed.
    pub fn was_updated(&self) -> bool {
        !self.added_keys.is_empty()
    }
}

/// Load configuration from `path`, filling in missing keys.
///
/// A missing or empty file is treated as an empty object. When any key had
/// to be added the file is rewritten, keeping values and unknown keys
/// already present.
pub fn load_or_init(path: &Path) -> ConfigResult<ConfigLoad> {
    let mut file = read_object(path)?;
    let defaults = serde_json::to_value(Config::default())?;

    let mut added_keys = Vec::new();
    for key in Config::KEYS {
        if !file.contains_key(*key) {
            let value = defaults.get(*key).cloned().unwrap_or(Value::Null);
            file.insert((*key).to_string(), value);
            added_keys.push((*key).to_string());
        }
    }

    let file = Value::Object(file);
    if !added_keys.is_empty() {
        write_json(path, &file)?;
        tracing::info!(path = %path.display(), "config file updated");
        tracing::debug!(keys = %added_keys.join(", "), "config keys added");
    }

    let config = serde_json::from_value(file)?;
    Ok(ConfigLoad { config, added_keys })
}

fn read_object(path: &Path) -> ConfigResult<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject(path.to_path_buf())),
    }
}

fn write_json(path: &Path, value: &Value) -> ConfigResult<()> {
    let contents = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}
