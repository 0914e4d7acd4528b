use participa_core::ErrorKind;
use thiserror::Error;

/// Failure of a logical request, after retries.
///
/// Callers switch on [`ApiError::kind`]; `message` carries the technical
/// detail for logs and should not be shown to staff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Fixed, localized text for this failure class.
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

/// Failure of a single exchange, before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network failure: {0}")]
    Network(String),
    #[error("cross-origin request refused: {0}")]
    CrossOrigin(String),
    #[error("{0}")]
    Other(String),
}
