//! Error types for client construction, sessions and commands
//!
//! Construction problems (missing host, undeclared namespace or resource) are
//! reported as [`ClientError`] configuration variants. Failures while talking
//! to a server are split in two: [`HttpError`] when the server answered with
//! an error status, [`TransportError`] when no usable answer came back at all.

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors produced by clients, sessions and commands
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// A constructor argument was missing or empty
    #[error("Invalid value for argument \"{argument}\"")]
    InvalidArgument {
        /// Name of the argument
        argument: &'static str,
    },

    /// The client type did not declare a plugin namespace
    #[error("A client must declare a non-empty plugin namespace")]
    MissingNamespace,

    /// A REST command did not declare the resource it targets
    #[error("Command '{command}' must declare a non-empty resource")]
    MissingResource {
        /// Type name of the command
        command: String,
    },

    /// The plugin discovery backend failed for a reason other than
    /// "no plugins registered"
    #[error("Plugin discovery failed for namespace '{namespace}': {source}")]
    Discovery {
        /// Namespace being resolved
        namespace: String,
        /// Backend failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with an error status
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request never produced a response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Create an invalid argument error
    pub fn invalid_argument(argument: &'static str) -> Self {
        Self::InvalidArgument { argument }
    }

    /// Create a missing resource error for the named command type
    pub fn missing_resource(command: impl Into<String>) -> Self {
        Self::MissingResource {
            command: command.into(),
        }
    }

    /// Create a discovery error wrapping the backend failure
    pub fn discovery(
        namespace: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Discovery {
            namespace: namespace.into(),
            source: source.into(),
        }
    }

    /// Whether this error is a configuration problem detected at construction
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::MissingNamespace | Self::MissingResource { .. }
        )
    }
}

/// Errors raised below HTTP: name resolution, connect, TLS, timeouts
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The request did not complete within the session timeout
    #[error("Request timed out")]
    Timeout,

    /// The connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// TLS setup or handshake failed, including unreadable CA bundles
    #[error("TLS error: {0}")]
    Tls(String),

    /// Any other transport failure
    #[error("Transport error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// The server answered, but with a 4xx or 5xx status
///
/// `reason` starts as the canonical reason phrase of the status and may be
/// replaced by the `message` field of a JSON error body, see
/// [`HttpCommand::raise_from_response`](crate::HttpCommand::raise_from_response).
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Response status
    pub status: StatusCode,
    /// Human-readable reason
    pub reason: String,
    /// URL of the failed request
    pub url: String,
    /// Raw response body
    pub body: Bytes,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.status.is_server_error() {
            "Server"
        } else {
            "Client"
        };
        write!(
            f,
            "{} {} Error: {} for url: {}",
            self.status.as_u16(),
            kind,
            self.reason,
            self.url
        )
    }
}

impl std::error::Error for HttpError {}
