use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload returned by the admin API.
///
/// OAuth endpoints answer with `error`/`error_description`, the user
/// endpoints with `code`/`message`. Every field is optional so that either
/// shape decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// Decode a response body, keeping non-JSON text as the message.
    pub fn from_text(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| {
            let trimmed = text.trim();
            Self {
                message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                ..Self::default()
            }
        })
    }

    /// Most specific human readable text in the body.
    pub fn summary(&self) -> &str {
        self.error_description
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .unwrap_or("no details")
    }
}

/// Failure of an authentication call, carried verbatim by failure events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("HTTP {status}: {}", .body.summary())]
    Http { status: u16, body: ErrorBody },

    #[error("network error: {0}")]
    Network(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl AuthError {
    pub fn error_description(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => body.error_description.as_deref(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Http { body, .. } => body.code,
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
