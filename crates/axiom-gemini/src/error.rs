//! Gemini client errors

use axiom_core::AssistError;

/// Gemini client error
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// No API key configured
    #[error("missing API key (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// Request failed or returned a non-success status
    #[error("http error{}: {message}", status.map(|s| format!(" {s}")).unwrap_or_default())]
    Http {
        /// Response status, absent when no response arrived
        status: Option<u16>,
        /// Error body or transport message
        message: String,
    },

    /// No candidate text in the response
    #[error("empty response")]
    EmptyResponse,

    /// Candidate text did not match the expected JSON shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GeminiError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<GeminiError> for AssistError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::MissingApiKey => Self::Unavailable(error.to_string()),
            GeminiError::Http { .. } if error.is_retryable() => Self::Unavailable(error.to_string()),
            GeminiError::Http { .. } => Self::Rejected(error.to_string()),
            GeminiError::EmptyResponse | GeminiError::Malformed(_) => {
                Self::Malformed(error.to_string())
            }
        }
    }
}
