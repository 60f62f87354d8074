//! Configuration for the AlgeSpace backend and tracking client
//!
//! Settings are read from a TOML file with per-section defaults; a missing
//! file yields the development defaults. Secrets (bearer token, API key)
//! can additionally be supplied through `ALGESPACE_*` environment
//! variables, which take precedence over the file.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:5161"
//! environment = "development"
//! allowed_origins = ["https://algespace.example.org"]
//!
//! [auth]
//! bearer_token = "..."
//! api_key = "..."
//!
//! [database]
//! exercises_path = "/var/lib/algespace/exercises.db"
//! studies_path = "/var/lib/algespace/studies.db"
//! ```

use crate::error::{AlgespaceError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Deployment environment
///
/// Development relaxes CORS and skips the API-key requirement; production
/// enforces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Complete settings for the backend binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Authentication settings
    #[serde(default)]
    pub auth: AuthSettings,

    /// Database file locations
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    pub addr: SocketAddr,

    /// Deployment environment
    pub environment: Environment,

    /// Origins allowed by CORS; ignored in development (permissive)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 5161).into(),
            environment: Environment::default(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Authentication material expected from clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Expected bearer token; empty disables the bearer check
    pub bearer_token: String,

    /// Expected `X-API-Key` value; checked only outside development
    pub api_key: String,
}

/// Database file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Exercise definition database
    pub exercises_path: PathBuf,

    /// Study tracking database
    pub studies_path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let dir = default_data_dir();
        Self {
            exercises_path: dir.join("exercises.db"),
            studies_path: dir.join("studies.db"),
        }
    }
}

/// Default data directory using the platform-local data dir
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("algespace")
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                AlgespaceError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read config file: {}", e),
                ))
            })?;
            let settings: Settings = toml::from_str(&content).map_err(|e| {
                AlgespaceError::Config(format!("Failed to parse config file: {}", e))
            })?;
            tracing::info!("Loaded configuration from {:?}", path);
            settings
        } else {
            tracing::info!("Config file not found, using defaults: {:?}", path);
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Save settings to a TOML file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AlgespaceError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AlgespaceError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create config directory: {}", e),
                ))
            })?;
        }

        std::fs::write(path, content).map_err(|e| {
            AlgespaceError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config file: {}", e),
            ))
        })?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Environment variables win over file contents for secrets
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = env::var("ALGESPACE_BEARER_TOKEN") {
            if !token.is_empty() {
                self.auth.bearer_token = token;
            }
        }
        if let Ok(key) = env::var("ALGESPACE_API_KEY") {
            if !key.is_empty() {
                self.auth.api_key = key;
            }
        }
    }

    /// Whether requests must carry a valid `X-API-Key` header
    pub fn require_api_key(&self) -> bool {
        self.server.environment == Environment::Production && !self.auth.api_key.is_empty()
    }

    /// Whether requests must carry a valid bearer token
    pub fn require_bearer(&self) -> bool {
        !self.auth.bearer_token.is_empty()
    }
}
