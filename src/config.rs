//! Configuration for the AppDeck portal server

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Directory holding the app collection document and uploaded icons
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Admin login secret. When unset, login always fails with a server
    /// configuration error — there is no auto-generation.
    /// Set via APPDECK_ADMIN_SECRET or the config file.
    #[serde(default)]
    pub admin_secret: Option<String>,

    /// Mark session cookies `Secure` (production behind TLS).
    #[serde(default)]
    pub secure_cookies: bool,

    /// Log level filter string.
    /// Set via config file or APPDECK_LOG_LEVEL. Overridden by RUST_LOG.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions for serde
fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "appdeck=debug,tower_http=debug".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_dir: default_data_dir(),
            admin_secret: None,
            secure_cookies: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("APPDECK_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.listen_addr = parsed;
            }
        }

        if let Ok(dir) = std::env::var("APPDECK_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config.admin_secret = std::env::var("APPDECK_ADMIN_SECRET").ok();

        if let Ok(secure) = std::env::var("APPDECK_SECURE_COOKIES") {
            config.secure_cookies = secure == "true" || secure == "1";
        }

        if let Ok(level) = std::env::var("APPDECK_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment.
    /// The admin secret env var always wins over the file so the secret
    /// never needs to live on disk.
    pub fn load() -> Self {
        let mut config = Self::load_base();

        if let Ok(secret) = std::env::var("APPDECK_ADMIN_SECRET") {
            config.admin_secret = Some(secret);
        }

        config
    }

    fn load_base() -> Self {
        if let Ok(path) = std::env::var("APPDECK_CONFIG") {
            if let Ok(config) = Self::from_file(&path) {
                return config;
            }
        }

        for path in &["appdeck.toml", "/etc/appdeck/config.toml"] {
            if std::path::Path::new(path).exists() {
                if let Ok(config) = Self::from_file(path) {
                    return config;
                }
            }
        }

        Self::from_env()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
