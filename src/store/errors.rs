//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type DataResult<T> = Result<T, DataError>;

/// Failure reported by the underlying database link.
///
/// Carries the driver's human-readable message and nothing else; the HTTP
/// layer surfaces it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataError {
    message: String,
}

impl DataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Server-side failures: keep the MySQL message, drop sqlx's prefix
            sqlx::Error::Database(db_err) => Self::new(db_err.message()),
            other => Self::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let err = DataError::new("Table 'clinic.patient' doesn't exist");
        assert_eq!(err.to_string(), "Table 'clinic.patient' doesn't exist");
        assert_eq!(err.message(), "Table 'clinic.patient' doesn't exist");
    }

    #[test]
    fn test_from_driver_error() {
        let err = DataError::from(sqlx::Error::PoolClosed);
        assert!(!err.message().is_empty());
    }
}
