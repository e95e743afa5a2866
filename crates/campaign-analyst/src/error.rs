//! Error types for the campaign analysis service.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from the model API client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// No API key configured; the client refuses to be constructed.
    #[error("API key not configured. Set GEMINI_API_KEY to use the AI features.")]
    MissingApiKey,

    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// The provider rejected the credential.
    #[error("API_KEY_NOT_VALID: {message}")]
    InvalidApiKey {
        /// Error message from API
        message: String,
    },

    /// Rate limited or quota exhausted (429 response)
    #[error("Rate limited (quota), retry after {retry_after:?}: {message}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
        /// Error message from API
        message: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The model returned no usable text.
    #[error("Model returned an empty response{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyResponse {
        /// Finish or block reason reported by the provider, if any
        reason: Option<String>,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64, message: impl Into<String>) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds), message: message.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from running one analysis.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// The campaign context was blank.
    #[error("Please provide some details for the analysis.")]
    EmptyContext,

    /// Another analysis is already in flight.
    #[error("An analysis is already in progress")]
    Busy,

    /// Error from the model client
    #[error("API error: {0}")]
    Client(#[from] ClientError),
}

impl AnalysisError {
    /// Convert to the message shown to the user.
    ///
    /// Credential and quota failures get fixed guidance; anything else from
    /// the provider is wrapped with the underlying message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::EmptyContext => {
                "Please provide some details for the analysis.".to_string()
            }
            Self::Busy => {
                "An analysis is already running. Please wait for it to finish.".to_string()
            }
            Self::Client(ClientError::MissingApiKey) => {
                "API_KEY environment variable not configured. Please set it to use the AI features."
                    .to_string()
            }
            Self::Client(err) => {
                let message = err.to_string();
                if matches!(err, ClientError::InvalidApiKey { .. })
                    || message.contains("API_KEY_NOT_VALID")
                {
                    "Invalid API Key. Please check your API_KEY environment variable.".to_string()
                } else if matches!(err, ClientError::RateLimited { .. })
                    || message.contains("quota")
                {
                    "API quota exceeded. Please check your Google Cloud console.".to_string()
                } else {
                    format!("Failed to get analysis from AI: {message}")
                }
            }
        }
    }

    /// Returns true if the failure came from user input rather than the
    /// service or provider.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyContext)
    }
}

/// Errors from exporting a rendered analysis as a document.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Rasterising the rendered view failed.
    #[error("Failed to capture analysis view: {0}")]
    Capture(String),

    /// Decoding or encoding an image failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The brand mark could not be loaded. A simplified fallback document
    /// was still saved.
    #[error("Failed to load logo for PDF: {reason}")]
    BrandMarkUnavailable {
        /// Why loading failed
        reason: String,
        /// Where the fallback document was saved
        fallback: Option<PathBuf>,
    },

    /// Writing the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another export is already in flight.
    #[error("An export is already in progress")]
    Busy,

    /// There is no completed analysis with content to export.
    #[error("No analysis content available to download.")]
    NoContent,

    /// A blocking task panicked or was cancelled.
    #[error("Export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExportError {
    /// Create a capture error.
    #[must_use]
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture(message.into())
    }

    /// Create a brand-mark error with no fallback recorded yet.
    #[must_use]
    pub fn brand_mark(reason: impl Into<String>) -> Self {
        Self::BrandMarkUnavailable { reason: reason.into(), fallback: None }
    }
}

/// Errors from the local preferences store.
#[derive(thiserror::Error, Debug)]
pub enum PreferencesError {
    /// Reading or writing the file failed.
    #[error("Preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The preferences could not be serialized.
    #[error("Preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60, "quota").is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        assert!(!ClientError::MissingApiKey.is_retryable());
        assert!(!ClientError::bad_request("invalid prompt").is_retryable());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(30, "slow down");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));

        let err = ClientError::bad_request("nope");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_user_message_invalid_key() {
        let err = AnalysisError::from(ClientError::bad_request(
            "API key not valid. Please pass a valid API key. [reason: API_KEY_NOT_VALID]",
        ));
        assert!(err.to_user_message().starts_with("Invalid API Key"));
    }

    #[test]
    fn test_user_message_quota() {
        let err = AnalysisError::from(ClientError::rate_limited(60, "Resource exhausted"));
        assert!(err.to_user_message().starts_with("API quota exceeded"));

        let err = AnalysisError::from(ClientError::server(503, "quota check failed"));
        assert!(err.to_user_message().starts_with("API quota exceeded"));
    }

    #[test]
    fn test_user_message_other_provider_failure() {
        let err = AnalysisError::from(ClientError::server(500, "boom"));
        let msg = err.to_user_message();
        assert!(msg.starts_with("Failed to get analysis from AI:"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_user_message_validation() {
        assert!(AnalysisError::EmptyContext.is_validation());
        assert!(!AnalysisError::Busy.is_validation());
        assert_eq!(
            AnalysisError::EmptyContext.to_user_message(),
            "Please provide some details for the analysis."
        );
        assert_eq!(AnalysisError::EmptyContext.to_string(), "Please provide some details for the analysis.");
    }

    #[test]
    fn test_empty_response_display() {
        let err = ClientError::EmptyResponse { reason: Some("SAFETY".to_string()) };
        assert_eq!(err.to_string(), "Model returned an empty response (SAFETY)");
        let err = ClientError::EmptyResponse { reason: None };
        assert_eq!(err.to_string(), "Model returned an empty response");
    }
}
