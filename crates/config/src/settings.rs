//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Banking assistant configuration
    #[serde(default)]
    pub banking: BankingConfig,

    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            banking: BankingConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checks (disable only for development)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; empty defaults to localhost
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted message length in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_true() -> bool {
    true
}
fn default_max_message_chars() -> usize {
    2000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

/// Banking assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankingConfig {
    /// Bank name used in greetings
    #[serde(default = "default_bank_name")]
    pub bank_name: String,

    /// Assistant name used in greetings
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Security answer failures tolerated before lockout
    #[serde(default = "default_max_attempts")]
    pub max_verification_attempts: u8,

    /// Inactivity timeout after which a session expires
    #[serde(default = "default_session_timeout")]
    pub session_timeout_minutes: i64,

    /// Interval between expiry sweeps, in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,

    /// Transactions returned per history request
    #[serde(default = "default_history_limit")]
    pub transaction_history_limit: usize,

    /// Look-back window for transaction history, in days
    #[serde(default = "default_history_days")]
    pub transaction_history_days: i64,
}

fn default_bank_name() -> String {
    "Bank Of AI".to_string()
}
fn default_assistant_name() -> String {
    "NANO".to_string()
}
fn default_max_attempts() -> u8 {
    3
}
fn default_session_timeout() -> i64 {
    30
}
fn default_cleanup_interval() -> u64 {
    300
}
fn default_history_limit() -> usize {
    5
}
fn default_history_days() -> i64 {
    30
}

impl Default for BankingConfig {
    fn default() -> Self {
        Self {
            bank_name: default_bank_name(),
            assistant_name: default_assistant_name(),
            max_verification_attempts: default_max_attempts(),
            session_timeout_minutes: default_session_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
            transaction_history_limit: default_history_limit(),
            transaction_history_days: default_history_days(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.banking.max_verification_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "banking.max_verification_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.banking.session_timeout_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "banking.session_timeout_minutes".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.server.max_message_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_message_chars".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from an optional TOML file plus NANO_-prefixed environment
/// variables. Environment wins over file, file wins over defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    } else if Path::new("nano.toml").exists() {
        builder = builder.add_source(File::with_name("nano"));
    }

    builder = builder.add_source(Environment::with_prefix("NANO").separator("__"));

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    tracing::debug!(
        bank = %settings.banking.bank_name,
        port = settings.server.port,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.banking.bank_name, "Bank Of AI");
        assert_eq!(settings.banking.max_verification_attempts, 3);
        assert_eq!(settings.banking.session_timeout_minutes, 30);
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.log_level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut settings = Settings::default();
        settings.banking.max_verification_attempts = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = load_settings(Some(Path::new("/nonexistent/nano.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
