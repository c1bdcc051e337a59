//! HTTP transport abstraction for pluggable backends
//!
//! A [`Transport`] opens one [`Connection`] per session from the
//! [`SessionSettings`] computed by the client. The connection only has to
//! execute fully-formed [`HttpRequest`]s; default headers are merged by the
//! session before the request reaches it.

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientResult, HttpError};

mod reqwest_backend;

pub use reqwest_backend::ReqwestTransport;

/// Certificate validation policy applied to secure sessions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Validate against the transport's built-in roots
    #[default]
    Verify,
    /// Validate against the certificates of a PEM bundle only
    CaBundle(PathBuf),
    /// Skip certificate validation entirely
    Insecure,
}

/// HTTP authentication scheme used with [`Credentials`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Credentials sent up front with every request
    #[default]
    Basic,
    /// Credentials hashed against the server's `WWW-Authenticate` challenge
    Digest,
}

/// Credentials attached to every request of a session
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// How the credentials are presented to the server
    pub scheme: AuthScheme,
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Basic-auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Basic,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Digest-auth credentials
    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Digest,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything a transport needs to open a session
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    /// Headers sent with every request of the session
    pub headers: HeaderMap,
    /// Per-request timeout; `None` means requests may block indefinitely
    pub timeout: Option<Duration>,
    /// Certificate validation policy
    pub tls: TlsPolicy,
    /// Optional basic or digest credentials
    pub credentials: Option<Credentials>,
}

/// An HTTP request sent through a [`Connection`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method
    pub method: Method,
    /// The fully-qualified URL
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Optional request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request without headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add or replace one header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add or replace several headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in &headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Set a raw body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type`
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> ClientResult<Self> {
        let body = serde_json::to_vec(value)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(Bytes::from(body));
        Ok(self)
    }
}

/// An HTTP response returned by a [`Connection`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    reason: String,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Create a response; the reason starts as the canonical phrase of `status`
    pub fn new(status: StatusCode, url: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            url: url.into(),
            headers,
            body,
        }
    }

    /// The HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Replace the reason reported by [`error_for_status`](Self::error_for_status)
    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    /// URL the response was received from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes
    pub fn content(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Whether the status is 4xx or 5xx
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// Turn a 4xx/5xx response into an [`HttpError`], pass anything else through
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_error() {
            Err(HttpError {
                status: self.status,
                reason: self.reason,
                url: self.url,
                body: self.body,
            })
        } else {
            Ok(self)
        }
    }
}

/// One open session with a server
///
/// Connections are owned by the [`Session`](crate::Session) that opened them
/// and are never shared between threads.
pub trait Connection: Send + fmt::Debug {
    /// Send a request and wait for the response
    ///
    /// Backends report transport failures as
    /// [`ClientError::Transport`](crate::ClientError::Transport). A backend
    /// that raises on error statuses by itself reports them as
    /// [`ClientError::Http`](crate::ClientError::Http).
    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

/// Trait for pluggable HTTP client backends
pub trait Transport: Send + Sync + fmt::Debug {
    /// Open a new connection configured from `settings`
    fn open(&self, settings: &SessionSettings) -> ClientResult<Box<dyn Connection>>;
}
