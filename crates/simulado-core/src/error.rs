//! Error types for providers, question generation, sessions and storage.
//!
//! `ProviderError` lives here rather than in `simulado-providers` so the
//! generation client can wrap it without depending on any concrete backend.

use thiserror::Error;

/// Generic message shown to the learner when a simulation cannot be generated.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Não foi possível gerar o simulado. A IA está sobrecarregada.";

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Failures of the question generation client.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("question count must be positive, got {0}")]
    InvalidCount(u32),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("provider returned no content")]
    EmptyResponse,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response contained no questions")]
    NoQuestions,

    /// A question object did not match the requested schema.
    #[error("question {index} is malformed: {reason}")]
    MalformedQuestion { index: usize, reason: String },
}

impl GenerationError {
    /// The retry-suggesting text shown to the learner; details go to the log.
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

/// Errors from the local key-value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected operations and failures of an exam session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The entry request has no subject; the caller should return to setup.
    #[error("no subject selected for the simulation")]
    MissingSubject,

    #[error("invalid simulation parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("session was already started")]
    AlreadyStarted,

    #[error("session is not in progress")]
    NotInProgress,

    #[error("session is not waiting for questions")]
    NotLoading,

    #[error("session has already finished")]
    Finished,

    #[error("option {0} does not exist")]
    OptionOutOfRange(usize),

    #[error("answer was already checked")]
    AlreadyChecked,

    #[error("no option selected")]
    NoSelection,

    #[error("answer has not been checked yet")]
    NotChecked,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from result aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("cannot summarize a session without questions")]
    EmptySession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_is_transparent_through_generation() {
        let err: GenerationError = ProviderError::RateLimited {
            retry_after_ms: 5000,
        }
        .into();
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn malformed_question_names_index() {
        let err = GenerationError::MalformedQuestion {
            index: 2,
            reason: "expected 5 options, got 4".into(),
        };
        assert!(err.to_string().contains("question 2"));
    }
}
