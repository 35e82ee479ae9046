//! Error types for the analysis pipeline

use thiserror::Error;

/// Result type alias for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during analysis operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// HTTP request error
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat backend answered with a non-success status
    #[error("chat backend returned {status}: {body}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The chat backend answered without usable content
    #[error("chat response contained no content")]
    EmptyResponse,

    /// The model reply could not be parsed into the expected shape
    #[error("failed to parse model output: {message}")]
    Parse {
        /// Parse failure details
        message: String,
    },

    /// No speaker-annotated segments were available
    #[error("no speaker information available")]
    NoSpeakerData,

    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl AnalysisError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let error = AnalysisError::Backend {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(error.to_string(), "chat backend returned 429: rate limited");
    }

    #[test]
    fn test_parse_error_display() {
        let error = AnalysisError::parse("expected an items array");
        assert!(error.to_string().contains("expected an items array"));
    }

    #[test]
    fn test_no_speaker_data_display() {
        assert_eq!(
            AnalysisError::NoSpeakerData.to_string(),
            "no speaker information available"
        );
    }
}
