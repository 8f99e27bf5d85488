//! Error type surfaced by every API operation

use thiserror::Error;

use crate::session::SessionError;

/// The single failure kind reported to callers of the API gateway
///
/// Validation, authentication, server and transport failures all collapse
/// into one human-readable message; callers only ever display it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A request did not succeed; the message is ready for display
    #[error("{0}")]
    RequestFailed(String),
}

impl ApiError {
    /// The normalized message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::RequestFailed(message) => message,
        }
    }
}

/// A session write or removal failing behind login, registration or logout
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Session update failed: {err}");
        Self::RequestFailed(err.to_string())
    }
}
