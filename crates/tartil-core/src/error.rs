//! Transcription error types.
//!
//! Defined in `tartil-core` so the recitation engine can downcast and classify
//! transcriber failures for fallback decisions without string matching. The
//! pure scoring pipeline has no errors of its own.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when a transcriber processes audio.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The backend is not reachable or not configured.
    #[error("transcriber unavailable: {0}")]
    Unavailable(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The upload is not audio the backend can decode.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Every transcriber in the chain failed.
    #[error("all transcribers failed: {}", format_attempts(.attempts))]
    AllFailed { attempts: Vec<FailedAttempt> },
}

impl TranscriptionError {
    /// Returns `true` if this error is caused by the input itself, so trying
    /// another transcriber would fail the same way.
    pub fn is_permanent(&self) -> bool {
        matches!(self, TranscriptionError::InvalidAudio(_))
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            TranscriptionError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// One failed link of a transcriber chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAttempt {
    /// Transcriber name.
    pub transcriber: String,
    /// Rendered error message.
    pub error: String,
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.transcriber, self.error)
    }
}

fn format_attempts(attempts: &[FailedAttempt]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
