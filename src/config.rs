//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub registration: RegistrationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend serves table and auth calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Hosted database/auth service
    Remote,
    /// In-memory demo dataset
    #[serde(alias = "mock")]
    Fixture,
}

impl std::str::FromStr for BackendMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(BackendMode::Remote),
            "fixture" | "mock" => Ok(BackendMode::Fixture),
            other => Err(ConfigError::Invalid(format!(
                "backend mode must be remote or fixture, got {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Remote => write!(f, "remote"),
            BackendMode::Fixture => write!(f, "fixture"),
        }
    }
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_mode")]
    pub mode: BackendMode,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_backend_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_documents_bucket")]
    pub documents_bucket: String,
}

fn default_backend_mode() -> BackendMode {
    BackendMode::Fixture
}

fn default_backend_timeout() -> u64 {
    10_000
}

fn default_documents_bucket() -> String {
    "kyc-documents".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: default_backend_mode(),
            url: String::new(),
            api_key: String::new(),
            request_timeout_ms: default_backend_timeout(),
            documents_bucket: default_documents_bucket(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_upload() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            max_upload_bytes: default_max_upload(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Registration flow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// Attempts at reading back a just-created profile
    #[serde(default = "default_profile_attempts")]
    pub profile_fetch_attempts: u32,

    /// Pause between those attempts
    #[serde(default = "default_profile_delay")]
    pub profile_fetch_delay_ms: u64,
}

fn default_profile_attempts() -> u32 {
    3
}

fn default_profile_delay() -> u64 {
    1000
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            profile_fetch_attempts: default_profile_attempts(),
            profile_fetch_delay_ms: default_profile_delay(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// The first config file found wins. A file that exists but does not
    /// load or validate is an error, never a silent fall back to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("wealthdesk").join("config.toml")),
            Some(PathBuf::from("/etc/wealthdesk/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        Self::load_first(config_paths.iter().flatten())
    }

    fn load_first<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = paths.into_iter().find(|p| p.exists()) {
            let config = Self::load_with_env(path)?;
            tracing::info!("Loaded config from {:?}", path);
            return Ok(config);
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Backend overrides
        if let Ok(mode) = std::env::var("WEALTHDESK_BACKEND_MODE") {
            self.backend.mode = mode.parse()?;
        }
        if let Ok(url) = std::env::var("WEALTHDESK_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(key) = std::env::var("WEALTHDESK_BACKEND_KEY") {
            self.backend.api_key = key;
        }

        // API overrides
        if let Ok(host) = std::env::var("WEALTHDESK_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("WEALTHDESK_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WEALTHDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WEALTHDESK_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.mode == BackendMode::Remote {
            if self.backend.url.is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.url is required in remote mode".to_string(),
                ));
            }
            if self.backend.api_key.is_empty() {
                return Err(ConfigError::Invalid(
                    "backend.api_key is required in remote mode".to_string(),
                ));
            }
        }

        if self.registration.profile_fetch_attempts == 0 {
            return Err(ConfigError::Invalid(
                "registration.profile_fetch_attempts must be at least 1".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be pretty or json, got {}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# WealthDesk Configuration
#
# Environment variables override these settings:
# - WEALTHDESK_BACKEND_MODE
# - WEALTHDESK_BACKEND_URL
# - WEALTHDESK_BACKEND_KEY
# - WEALTHDESK_API_HOST
# - WEALTHDESK_API_PORT
# - WEALTHDESK_LOG_LEVEL
# - WEALTHDESK_LOG_FORMAT

[backend]
# remote: hosted database/auth service; fixture: in-memory demo data
mode = "fixture"

# Project URL and key of the hosted service (remote mode only)
url = ""
api_key = ""

# Per-request timeout (ms)
request_timeout_ms = 10000

# Bucket receiving KYC documents
documents_bucket = "kyc-documents"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (empty = any)
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Largest accepted document upload (bytes)
max_upload_bytes = 10485760

[registration]
# Reads of a just-created profile before giving up
profile_fetch_attempts = 3

# Pause between reads (ms)
profile_fetch_delay_ms = 1000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.backend.mode, BackendMode::Fixture);
        assert_eq!(config.registration.profile_fetch_attempts, 3);
        assert_eq!(config.registration.profile_fetch_delay_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.backend.documents_bucket, "kyc-documents");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[backend]
mode = "remote"
url = "https://project.example.co"
api_key = "secret"

[api]
port = 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Remote);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_mode_requires_url_and_key() {
        let mut config = Config::default();
        config.backend.mode = BackendMode::Remote;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.backend.url = "https://project.example.co".to_string();
        assert!(config.validate().is_err());

        config.backend.api_key = "key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nmode = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_backend_mode_parse() {
        assert_eq!("Remote".parse::<BackendMode>().unwrap(), BackendMode::Remote);
        assert_eq!("mock".parse::<BackendMode>().unwrap(), BackendMode::Fixture);
        assert!("sqlite".parse::<BackendMode>().is_err());
    }

    #[test]
    fn test_invalid_file_is_an_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nmode = \"remote\"\nurl = \"https://project.example.co\"\n",
        )
        .unwrap();

        let err = Config::load_first([&path]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        std::fs::write(&present, "[api]\nport = 9100\n").unwrap();

        let config = Config::load_first([&missing, &present]).unwrap();
        assert_eq!(config.api.port, 9100);
    }

    #[test]
    fn test_mock_mode_alias_in_toml() {
        let config: Config = toml::from_str("[backend]\nmode = \"mock\"\n").unwrap();
        assert_eq!(config.backend.mode, BackendMode::Fixture);
    }
}
