//! Error type for catalog requests.

use thiserror::Error;

/// Failure of a catalog request, classified by where it went wrong.
///
/// `Clone` so one in-flight result can be handed to several waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("catalog API error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the raw body.
        message: String,
    },

    /// The body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The client could not be built or the request could not be formed.
    #[error("client configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether this failure came from the transport rather than the server.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status of a server failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Config(_) => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if err.is_builder() {
            return Self::Config(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Server {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_contains_status() {
        // Arrange
        let err = CatalogError::Server {
            status: 403,
            message: String::from("You are not subscribed to this API."),
        };

        // Act
        let text = err.to_string();

        // Assert
        assert!(text.contains("HTTP 403"));
        assert!(text.contains("not subscribed"));
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_network());
    }

    #[test]
    fn test_network_error_classification() {
        // Arrange
        let err = CatalogError::Network(String::from("connection refused"));

        // Act & Assert
        assert!(err.is_network());
        assert_eq!(err.status(), None);
    }
}
