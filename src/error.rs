//! Error taxonomy shared by the translation pipeline and the HTTP layer.

use thiserror::Error;

/// Everything that can go wrong between an incoming request and its response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Missing or empty required request fields. Surfaced as 400.
    #[error("{0}")]
    Validation(String),

    /// Any failure reported by (or while talking to) the translation provider.
    #[error("backend error: {0}")]
    Backend(String),

    /// A translated product payload that no longer has the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TranslateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TranslateError::Validation(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        TranslateError::Backend(msg.into())
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslateError::Backend(format!("request timed out: {err}"))
        } else if err.is_decode() {
            TranslateError::Backend(format!("unreadable response body: {err}"))
        } else {
            TranslateError::Backend(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::Backend(format!("JSON error: {err}"))
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
