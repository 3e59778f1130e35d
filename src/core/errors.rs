//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Connection could not be established or timed out
    #[error("Network error: {message}")]
    NetworkError {
        /// Human-readable description
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Parse error: {message}")]
    ParseError {
        /// Human-readable description
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable description
        message: String,
    },

    /// Service answered with a non-success HTTP status
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Start of the response body
        message: String,
    },
}

impl TranslationError {
    /// Shorthand for a [`TranslationError::ParseError`]
    pub fn parse(message: impl Into<String>) -> Self {
        TranslationError::ParseError {
            message: message.into(),
        }
    }

    /// Shorthand for a [`TranslationError::ConfigError`]
    pub fn config(message: impl Into<String>) -> Self {
        TranslationError::ConfigError {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::NetworkError {
                message: format!("request timed out: {}", err),
            }
        } else if err.is_builder() {
            TranslationError::ConfigError {
                message: err.to_string(),
            }
        } else {
            TranslationError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(err: serde_json::Error) -> Self {
        TranslationError::ParseError {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_becomes_parse_error() {
        let err: TranslationError = serde_json::from_str::<serde_json::Value>("[1,")
            .unwrap_err()
            .into();
        assert!(matches!(err, TranslationError::ParseError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = TranslationError::ApiError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - unavailable");
        assert_eq!(
            TranslationError::config("bad timeout").to_string(),
            "Configuration error: bad timeout"
        );
    }
}
