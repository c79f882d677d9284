//! Client error types

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which backend a request was sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// The main, authenticated API
    Primary,
    /// The optional secondary (VPS) API
    Secondary,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The exchange did not finish within the configured timeout
    #[error(
        "{backend} request timeout after {}ms - please check your connection",
        .after.as_millis()
    )]
    Timeout { backend: Backend, after: Duration },

    /// Server answered 401 on an authenticated route; stored credentials were purged
    #[error("Authentication expired")]
    AuthenticationExpired { endpoint: String },

    /// Server returned a non-success status
    #[error("HTTP error! status: {status} - {status_text}")]
    Http {
        backend: Backend,
        status: u16,
        status_text: String,
    },

    /// Endpoint name is not present in the endpoint table
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Header name or value could not be encoded
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Credential storage could not be read or written
    #[error("Credential storage error: {0}")]
    Credentials(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from a non-success HTTP status
    pub fn from_status(backend: Backend, status: reqwest::StatusCode) -> Self {
        Self::Http {
            backend,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// True when the session has expired and the user has to log in again
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationExpired { .. })
    }

    /// True when the request was cancelled by the client-side timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AuthenticationExpired { .. } => Some(401),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
