//! Error types for the account system client.

use thiserror::Error;

/// Errors that can occur while fetching from the account system.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// The configured server URL could not be used.
    #[error("Invalid account system URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server rejected the configured login.
    #[error("Authentication to {url} failed with HTTP status {status}")]
    AuthenticationFailed { url: String, status: u16 },

    /// The request never produced a response.
    #[error("Failed to reach {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Server returned HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl DirectoryError {
    /// Check if the server rejected our credentials.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, DirectoryError::AuthenticationFailed { .. })
    }

    /// Check if this error is about the response content rather than the transport.
    pub fn is_data_error(&self) -> bool {
        matches!(self, DirectoryError::Decode { .. })
    }
}

impl From<DirectoryError> for crate::Error {
    fn from(err: DirectoryError) -> Self {
        crate::Error::Directory(err)
    }
}
