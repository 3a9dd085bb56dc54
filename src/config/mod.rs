//! Database Connection Configuration
//!
//! Host, credentials, database name, port and the TLS policy for the link to
//! MySQL. Values are populated by the CLI from flags or the environment.
//!
//! # TLS
//!
//! | `SSL_MODE` | `accept_invalid_certs` | Transport |
//! |---|---|---|
//! | `DISABLED` | ignored | plaintext |
//! | `REQUIRED` | `false` (default) | encrypted, CA and host name verified |
//! | `REQUIRED` | `true` | encrypted, certificate not verified |
//!
//! # `.env`
//!
//! [`load_env_file`] reads `./.env` before the CLI parses its flags. A missing
//! file is fine; an unreadable or malformed one is a startup error.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid SSL mode '{0}', expected DISABLED or REQUIRED")]
    InvalidSslMode(String),

    #[error("Port must be > 0")]
    ZeroPort,

    #[error("Failed to load .env: {0}")]
    EnvFile(String),
}

/// Load `./.env` into the process environment if it exists.
///
/// Variables already set in the environment win over the file.
pub fn load_env_file() -> Result<(), ConfigError> {
    env_file_result(dotenvy::dotenv().map(|_| ()))
}

/// Load a specific env file, with the same missing-file rule as [`load_env_file`]
pub fn load_env_file_from(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    env_file_result(dotenvy::from_path(path))
}

fn env_file_result(result: dotenvy::Result<()>) -> Result<(), ConfigError> {
    match result {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

/// SSL mode as named in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Disabled,
    Required,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disabled => "DISABLED",
            SslMode::Required => "REQUIRED",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DISABLED" => Ok(SslMode::Disabled),
            "REQUIRED" => Ok(SslMode::Required),
            _ => Err(ConfigError::InvalidSslMode(s.to_string())),
        }
    }
}

/// Connection settings for the patient database
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ssl_mode: SslMode,

    /// CA bundle used to verify the server certificate
    pub ssl_ca: Option<PathBuf>,

    /// Skip certificate verification when `ssl_mode` is `REQUIRED`
    pub accept_invalid_certs: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

// Hand-written so the password never reaches a log line
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("ssl_ca", &self.ssl_ca)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Create a config with default host, port and TLS settings
    pub fn new(user: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: user.into(),
            password: None,
            database: database.into(),
            ssl_mode: SslMode::default(),
            ssl_ca: None,
            accept_invalid_certs: false,
        }
    }

    /// Validate before any connection attempt
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing("DB_HOST"));
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::Missing("DB_USER"));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Missing("DB_NAME"));
        }
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        Ok(())
    }

    /// True when the link is encrypted but the server is not authenticated
    pub fn is_insecure_tls(&self) -> bool {
        self.ssl_mode == SslMode::Required && self.accept_invalid_certs
    }

    /// Driver-level TLS mode for this config
    pub fn driver_ssl_mode(&self) -> MySqlSslMode {
        match self.ssl_mode {
            SslMode::Disabled => MySqlSslMode::Disabled,
            SslMode::Required if self.accept_invalid_certs => MySqlSslMode::Required,
            SslMode::Required => MySqlSslMode::VerifyIdentity,
        }
    }

    /// Build driver connect options
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(self.driver_ssl_mode());

        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(ca) = &self.ssl_ca {
            options = options.ssl_ca(ca);
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_parse() {
        assert_eq!("DISABLED".parse::<SslMode>().unwrap(), SslMode::Disabled);
        assert_eq!("required".parse::<SslMode>().unwrap(), SslMode::Required);
        assert!(matches!(
            "PREFERRED".parse::<SslMode>(),
            Err(ConfigError::InvalidSslMode(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::new("clinic", "hospital");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.ssl_mode, SslMode::Disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_required_verifies_by_default() {
        let mut config = DatabaseConfig::new("clinic", "hospital");
        config.ssl_mode = SslMode::Required;
        assert!(matches!(config.driver_ssl_mode(), MySqlSslMode::VerifyIdentity));
        assert!(!config.is_insecure_tls());

        config.accept_invalid_certs = true;
        assert!(matches!(config.driver_ssl_mode(), MySqlSslMode::Required));
        assert!(config.is_insecure_tls());
    }

    #[test]
    fn test_accept_invalid_certs_ignored_without_tls() {
        let mut config = DatabaseConfig::new("clinic", "hospital");
        config.accept_invalid_certs = true;
        assert!(matches!(config.driver_ssl_mode(), MySqlSslMode::Disabled));
        assert!(!config.is_insecure_tls());
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let config = DatabaseConfig::new("", "hospital");
        assert_eq!(config.validate(), Err(ConfigError::Missing("DB_USER")));

        let config = DatabaseConfig::new("clinic", " ");
        assert_eq!(config.validate(), Err(ConfigError::Missing("DB_NAME")));

        let mut config = DatabaseConfig::new("clinic", "hospital");
        config.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPort));
    }

    #[test]
    fn test_debug_hides_password() {
        let mut config = DatabaseConfig::new("clinic", "hospital");
        config.password = Some("hunter2".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(load_env_file_from(dir.path().join(".env")), Ok(()));
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NOT A VALID LINE\n").unwrap();

        let err = load_env_file_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)), "{:?}", err);
    }

    #[test]
    fn test_unreadable_env_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();

        // A directory opens but cannot be read as a file
        let err = load_env_file_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)), "{:?}", err);
    }

    #[test]
    fn test_env_file_error_is_reported_as_config() {
        let err = env_file_result(Err(dotenvy::Error::LineParse("X Y".to_string(), 2)));
        assert!(matches!(err, Err(ConfigError::EnvFile(_))));

        let missing = io::Error::new(io::ErrorKind::NotFound, "no .env");
        assert_eq!(env_file_result(Err(dotenvy::Error::Io(missing))), Ok(()));
    }
}
