//! Configuration file management
//!
//! `LinkConfig` is read from TOML. Every section and field is optional; a
//! missing file gives the defaults.
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://localhost:5000/api"  # Backend REST base URL
//! timeout_secs = 30                  # Request timeout
//! connect_timeout_secs = 10          # TCP + TLS handshake timeout
//!
//! [identity]
//! api_key = "your-web-api-key"
//! refresh_margin_secs = 300          # Refresh this long before expiry
//!
//! [storage]
//! token_file = "~/.config/barbearia/session.toml"
//!
//! [booking]
//! utc_offset_minutes = -180          # Shop time zone (UTC-03:00)
//!
//! [logging]
//! level = "info"
//! format = "compact"                 # compact, json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::booking::{offset_from_minutes, DEFAULT_UTC_OFFSET_MINUTES};
use crate::client::{BarberLinkClient, DEFAULT_BASE_URL};
use crate::error::{BarberLinkError, Result};
use crate::identity::firebase::{DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL};
use crate::identity::FirebaseIdentityClient;
use crate::timeouts::LinkTimeouts;
use crate::token_store::{FileTokenStore, TokenStore};

/// Client configuration loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Backend connection settings
    pub server: Option<ServerConfig>,

    /// Identity provider settings
    pub identity: Option<IdentityConfig>,

    /// Local session storage
    pub storage: Option<StorageConfig>,

    /// Booking time zone
    pub booking: Option<BookingConfig>,

    /// Log output
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// REST base URL, `/api` prefix included
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the identity project
    pub api_key: Option<String>,

    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Seconds before expiry at which the ID token is refreshed
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Session file; `~/` is expanded. Defaults to the platform config dir.
    pub token_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Minutes east of UTC used to interpret picked dates and slots
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level or `EnvFilter` directive (e.g. "info", "barber_link=debug")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: compact, json
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_server_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_refresh_margin_secs() -> u64 {
    300
}

fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            identity_url: default_identity_url(),
            token_url: default_token_url(),
            refresh_margin_secs: default_refresh_margin_secs(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

/// `<config_dir>/barbearia/config.toml`, next to the session file.
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join("barbearia").join("config.toml"),
        None => expand_config_path(Path::new("~/.config/barbearia/config.toml")),
    }
}

impl LinkConfig {
    /// Load configuration from file
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_config_path(path);

        if !path.exists() {
            log::debug!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            BarberLinkError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let path = expand_config_path(path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn resolved_identity(&self) -> IdentityConfig {
        self.identity.clone().unwrap_or_default()
    }

    pub fn resolved_storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn resolved_booking(&self) -> BookingConfig {
        self.booking.clone().unwrap_or_default()
    }

    pub fn resolved_logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Timeouts shared by the REST and identity clients.
    pub fn timeouts(&self) -> LinkTimeouts {
        let server = self.resolved_server();
        LinkTimeouts::builder()
            .connection_timeout_secs(server.connect_timeout_secs)
            .request_timeout_secs(server.timeout_secs)
            .token_refresh_margin_secs(self.resolved_identity().refresh_margin_secs)
            .build()
    }

    /// Session file location with `~/` expanded.
    pub fn token_file_path(&self) -> PathBuf {
        match self.resolved_storage().token_file {
            Some(file) => expand_config_path(Path::new(&file)),
            None => FileTokenStore::default_path(),
        }
    }

    pub fn token_store(&self) -> Result<FileTokenStore> {
        FileTokenStore::with_path(self.token_file_path())
    }

    /// REST client against the configured backend, authenticating from `store`.
    pub fn client(&self, store: Arc<dyn TokenStore>) -> Result<BarberLinkClient> {
        BarberLinkClient::builder()
            .base_url(self.resolved_server().url)
            .timeouts(self.timeouts())
            .token_store(store)
            .build()
    }

    /// Identity client; fails when no API key is configured.
    pub fn identity_client(&self) -> Result<FirebaseIdentityClient> {
        let identity = self.resolved_identity();
        let api_key = identity.api_key.ok_or_else(|| {
            BarberLinkError::ConfigurationError("[identity] api_key is not set".into())
        })?;

        FirebaseIdentityClient::builder()
            .api_key(api_key)
            .identity_url(identity.identity_url)
            .token_url(identity.token_url)
            .timeouts(self.timeouts())
            .build()
    }

    pub fn booking_offset(&self) -> Result<FixedOffset> {
        offset_from_minutes(self.resolved_booking().utc_offset_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = LinkConfig::load(&temp_dir.path().join("absent.toml")).unwrap();

        assert!(config.server.is_none());
        assert_eq!(config.resolved_server().url, DEFAULT_BASE_URL);
        assert_eq!(config.resolved_logging().level, "info");
        assert_eq!(config.booking_offset().unwrap().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = LinkConfig::from_toml_str(
            r#"
            [server]
            url = "https://api.barbearia.test/api"

            [identity]
            api_key = "key-123"
            "#,
        )
        .unwrap();

        let server = config.resolved_server();
        assert_eq!(server.url, "https://api.barbearia.test/api");
        assert_eq!(server.timeout_secs, 30);

        let identity = config.resolved_identity();
        assert_eq!(identity.api_key.as_deref(), Some("key-123"));
        assert_eq!(identity.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(identity.refresh_margin_secs, 300);
    }

    #[test]
    fn test_timeouts_from_config() {
        let config = LinkConfig::from_toml_str(
            r#"
            [server]
            timeout_secs = 5
            connect_timeout_secs = 2

            [identity]
            refresh_margin_secs = 60
            "#,
        )
        .unwrap();

        let timeouts = config.timeouts();
        assert_eq!(timeouts.request_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.connection_timeout, Duration::from_secs(2));
        assert_eq!(timeouts.token_refresh_margin, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = LinkConfig::from_toml_str("[server\nurl = ").unwrap_err();
        assert!(matches!(err, BarberLinkError::ConfigurationError(_)));
    }

    #[test]
    fn test_identity_client_requires_api_key() {
        let err = LinkConfig::default().identity_client().unwrap_err();
        assert!(matches!(err, BarberLinkError::ConfigurationError(_)));
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let config = LinkConfig::from_toml_str("[booking]\nutc_offset_minutes = 100000").unwrap();
        assert!(config.booking_offset().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let token_file = temp_dir.path().join("session.toml");

        let config = LinkConfig {
            storage: Some(StorageConfig {
                token_file: Some(token_file.to_string_lossy().into_owned()),
            }),
            booking: Some(BookingConfig {
                utc_offset_minutes: -240,
            }),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = LinkConfig::load(&path).unwrap();
        assert_eq!(loaded.token_file_path(), token_file);
        assert_eq!(loaded.resolved_booking().utc_offset_minutes, -240);

        let store = loaded.token_store().unwrap();
        assert_eq!(store.path(), token_file.as_path());
    }

    #[test]
    fn test_expand_config_path() {
        let plain = Path::new("/etc/barbearia/config.toml");
        assert_eq!(expand_config_path(plain), plain.to_path_buf());

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_config_path(Path::new("~/barbearia/config.toml")),
                home.join("barbearia/config.toml")
            );
        }
    }

    #[test]
    fn test_client_uses_configured_url() {
        let config = LinkConfig::from_toml_str("[server]\nurl = \"http://127.0.0.1:9/api/\"").unwrap();
        let store: Arc<dyn TokenStore> = Arc::new(crate::token_store::MemoryTokenStore::new());
        let client = config.client(store).unwrap();
        assert!(client.base_url().starts_with("http://127.0.0.1:9/api"));
    }
}
