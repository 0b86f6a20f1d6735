//! Registry error types.

use thiserror::Error;

use super::client::HttpResponse;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A non-2xx answer from the registry or a readme host.
///
/// Carries the request URL and the raw response so callers can decide which
/// statuses they are willing to tolerate.
#[derive(Debug, Clone, Error)]
#[error("{url} {}", .response.status)]
pub struct ResponseError {
    /// URL that was requested
    pub url: String,
    /// Response as received
    pub response: HttpResponse,
}

/// Errors that can occur while talking to the registry or its collaborators.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The server answered with a non-success status.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The request never produced a response.
    #[error("Network error: {url}: {message}")]
    Network { url: String, message: String },

    /// The response body was not the expected JSON shape.
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A URI that is not a `vscode:extension/<id>` URI.
    #[error("The given uri is not an vscode extension URI, uri: {0}")]
    InvalidUri(String),

    /// An identifier without a `publisher.name` shape.
    #[error("Invalid extension identifier: {0}")]
    InvalidId(String),

    /// The plugin host or opener reported a failure.
    #[error("Plugin host error: {0}")]
    Host(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// HTTP status of a [`RegistryError::Response`], if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.response.status),
            _ => None,
        }
    }

    /// Whether the registry reported that the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
