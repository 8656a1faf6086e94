//! Configuration management for the session demo server.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{ServerConfig, SessionSettings};
use crate::cli::{is_valid_cookie_name, Args};
use crate::store::CookieOptions;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Session configuration.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            graceful_shutdown: true,
        }
    }
}

/// Session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Session cookie name.
    pub cookie_name: String,
    /// Cookie attributes.
    pub cookie: CookieOptions,
    /// Save modified sessions after every request.
    pub auto_save: bool,
    /// Drop sessions idle for this many seconds (0 disables).
    pub idle_timeout_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            cookie: CookieOptions::default(),
            auto_save: false,
            idle_timeout_secs: 60 * 60 * 24,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("REQUEST_SESSIONS_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("REQUEST_SESSIONS_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(name) = std::env::var("REQUEST_SESSIONS_COOKIE_NAME") {
            if !name.is_empty() {
                self.session.cookie_name = name;
            }
        }

        if let Ok(level) = std::env::var("REQUEST_SESSIONS_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref name) = args.cookie_name {
            self.session.cookie_name = name.clone();
        }

        if args.auto_save {
            self.session.auto_save = true;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        if !is_valid_cookie_name(&self.session.cookie_name) {
            return Err(ConfigError::InvalidCookieName(
                self.session.cookie_name.clone(),
            ));
        }

        self.session
            .cookie
            .validate()
            .map_err(ConfigError::InvalidCookieAttribute)?;

        let session = SessionSettings {
            cookie_name: self.session.cookie_name.clone(),
            cookie: self.session.cookie.clone(),
            auto_save: self.session.auto_save,
            idle_timeout: (self.session.idle_timeout_secs > 0)
                .then(|| Duration::from_secs(self.session.idle_timeout_secs)),
        };

        let mut server_config =
            ServerConfig::new(host.to_string(), self.server.port).with_session(session);

        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// Cookie name is not a valid token.
    InvalidCookieName(String),
    /// Cookie path or domain contains a separator or control character.
    InvalidCookieAttribute(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidCookieName(name) => write!(f, "invalid cookie name: {:?}", name),
            Self::InvalidCookieAttribute(attribute) => {
                write!(
                    f,
                    "invalid cookie {}: separators and control characters are not allowed",
                    attribute
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
