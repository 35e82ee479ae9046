//! Error types for `MeetBrief`

use std::{error::Error as StdError, fmt};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type shared across `MeetBrief` crates
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Serialization error
    Serialization(serde_json::Error),

    /// Other error
    Other(String),
}

impl Error {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_configuration_error() {
        let error = Error::configuration("missing database url");
        assert_eq!(
            error.to_string(),
            "Configuration error: missing database url"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn test_validation_error_display() {
        let error = Error::Validation {
            field: "status".to_string(),
            message: "unknown meeting status: archived".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Validation error: status - unknown meeting status: archived"
        );
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = Error::from(json_error);

        assert!(matches!(error, Error::Serialization(_)));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_result_type_alias() {
        fn ok() -> Result<i32> {
            Ok(42)
        }

        fn fails() -> Result<i32> {
            Err(Error::Other("boom".to_string()))
        }

        assert!(matches!(ok(), Ok(42)));
        assert!(fails().is_err());
    }
}
