//! Error types for upstream WeSign calls.

use thiserror::Error;

/// Errors produced by [`super::WeSignClient`].
///
/// Messages never contain tokens or passwords.
#[derive(Error, Debug)]
pub enum ApiError {
    /// An authenticated call was attempted without an access token.
    #[error("Not authenticated. Please login first.")]
    NotAuthenticated,

    /// A refresh was requested but the session holds no refresh token.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The upstream answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The upstream `message` field, or a generic status description.
        message: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream body did not have the expected shape.
    #[error("unexpected response from WeSign: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be serialised.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// A 401 triggered a refresh and the refresh itself failed. The session
    /// has been cleared.
    #[error("Session expired and token refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),
}

/// Result alias for upstream calls.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status carried by the error, when the upstream answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
