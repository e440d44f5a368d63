//! Error types for remote listing operations.

use thiserror::Error;

/// Errors that can occur while fetching listings from the platform API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The branch, path, or resource does not exist.
    #[error("not found")]
    NotFound,

    /// The provider integration needs to be re-authorized.
    ///
    /// Surfaced as a distinct state so a UI can offer a re-connect action
    /// instead of a generic failure.
    #[error("provider integration requires re-authorization")]
    AuthorizationRequired,

    /// A network or server error.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Whether this error calls for re-authorizing the provider.
    pub fn is_authorization_required(&self) -> bool {
        matches!(self, FetchError::AuthorizationRequired)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
