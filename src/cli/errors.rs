//! Startup error types
//!
//! All startup errors are fatal: the process exits without serving traffic.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::DataError;

/// Result type for CLI commands
pub type StartupResult<T> = Result<T, StartupError>;

/// Startup error
#[derive(Debug, Error)]
pub enum StartupError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection could not be established
    #[error("Failed to connect to database: {0}")]
    Connect(DataError),

    /// Initial schema creation failed
    #[error("Failed to ensure patient table: {0}")]
    Schema(DataError),

    /// Listener could not be bound or the server stopped with an error
    #[error("HTTP server error: {0}")]
    Serve(io::Error),

    /// Async runtime could not be built
    #[error("Failed to start runtime: {0}")]
    Runtime(io::Error),

    /// Log subscriber could not be installed
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl StartupError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "GATEWAY_CONFIG_ERROR",
            Self::Connect(_) => "GATEWAY_CONNECT_FAILED",
            Self::Schema(_) => "GATEWAY_SCHEMA_FAILED",
            Self::Serve(_) => "GATEWAY_SERVE_FAILED",
            Self::Runtime(_) => "GATEWAY_RUNTIME_FAILED",
            Self::Logging(_) => "GATEWAY_LOGGING_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StartupError::Schema(DataError::new("CREATE command denied"));
        assert_eq!(err.code(), "GATEWAY_SCHEMA_FAILED");
        assert!(err.to_string().contains("CREATE command denied"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err = StartupError::from(ConfigError::ZeroPort);
        assert_eq!(err.code(), "GATEWAY_CONFIG_ERROR");
        assert!(err.to_string().contains("Port must be > 0"));
    }
}
