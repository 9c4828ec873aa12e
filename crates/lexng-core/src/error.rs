use serde::Serialize;

use crate::text::truncate_chars;

/// Characters of raw model output kept for diagnostics.
pub const EXCERPT_CHARS: usize = 200;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential configured. Callers normally switch to demo/template
    /// behaviour instead of surfacing this.
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed model output: {reason}")]
    MalformedModelOutput { reason: String, excerpt: String },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("completion request failed: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ServiceUnavailable,
    MalformedModelOutput,
    NotFound,
    ValidationError,
    TransientNetworkError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::MalformedModelOutput => "MALFORMED_MODEL_OUTPUT",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::TransientNetworkError => "TRANSIENT_NETWORK_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedModelOutput {
            reason: reason.into(),
            excerpt: truncate_chars(raw, EXCERPT_CHARS).to_string(),
        }
    }

    pub fn analysis_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            what: "analysis",
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::MalformedModelOutput { .. } => ErrorKind::MalformedModelOutput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Network(_) => ErrorKind::TransientNetworkError,
        }
    }

    /// Stable end-user message. Never contains model output or upstream detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => {
                "The AI service is not configured. Please try again later."
            }
            Self::MalformedModelOutput { .. } => {
                "The AI service returned a response in an unexpected format. Please try again."
            }
            Self::NotFound { .. } => "The requested document could not be found.",
            Self::Validation(_) => {
                "The information provided is invalid. Please check your inputs and try again."
            }
            Self::Network(_) => {
                "There was a problem connecting to the AI service. Please try again later."
            }
        }
    }

    /// Detail intended for development diagnostics only.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::MalformedModelOutput { reason, excerpt } => {
                format!("{reason}. First {EXCERPT_CHARS} chars of response: {excerpt}")
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_keeps_a_bounded_excerpt() {
        let raw = "é".repeat(500);
        let err = Error::malformed("expected JSON", &raw);
        match &err {
            Error::MalformedModelOutput { excerpt, .. } => {
                assert_eq!(excerpt.chars().count(), EXCERPT_CHARS)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::MalformedModelOutput);
        assert!(err.diagnostic().contains("expected JSON"));
    }

    #[test]
    fn user_message_does_not_leak_detail() {
        let err = Error::malformed("bad", "SECRET MODEL TEXT");
        assert!(!err.user_message().contains("SECRET"));
        let err = Error::Network("401 invalid api key gsk_123".into());
        assert!(!err.user_message().contains("gsk_"));
    }

    #[test]
    fn kinds_render_as_stable_codes() {
        assert_eq!(Error::analysis_not_found("abc").kind().as_str(), "NOT_FOUND");
        assert_eq!(
            serde_json::to_value(ErrorKind::TransientNetworkError).unwrap(),
            "TRANSIENT_NETWORK_ERROR"
        );
    }
}
