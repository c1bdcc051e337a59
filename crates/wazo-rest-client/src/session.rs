//! Per-call HTTP sessions
//!
//! A [`Session`] is opened fresh every time a client or command asks for one.
//! [`SessionFactory`] holds the connection policy captured at client
//! construction and turns it, together with the client's current token and
//! tenant, into the [`SessionSettings`] handed to the transport.

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::time::Duration;
use tracing::warn;

use crate::config::VerifyCertificate;
use crate::error::ClientResult;
use crate::transport::{
    Connection, Credentials, HttpRequest, HttpResponse, SessionSettings, TlsPolicy, Transport,
};

/// Header carrying the authentication token
pub const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// Header scoping a request to a tenant
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("wazo-tenant");

/// Connection policy shared by every session of one client
#[derive(Debug, Clone)]
pub struct SessionFactory {
    https: bool,
    verify_certificate: VerifyCertificate,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    credentials: Option<Credentials>,
}

impl SessionFactory {
    /// Capture the policy for a client
    pub fn new(
        https: bool,
        verify_certificate: VerifyCertificate,
        timeout: Option<Duration>,
        user_agent: Option<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            https,
            verify_certificate,
            timeout,
            user_agent,
            credentials,
        }
    }

    /// Request timeout applied to every session
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Compute the settings of a new session
    ///
    /// `Connection: close` is always set. Token, tenant and user agent
    /// headers are only added when non-empty. Certificate policy only
    /// matters for secure sessions; plain HTTP keeps the transport default.
    pub fn settings(&self, token: Option<&str>, tenant: Option<&str>) -> SessionSettings {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            insert_header(&mut headers, AUTH_TOKEN_HEADER, token);
        }

        if let Some(tenant) = tenant.filter(|t| !t.is_empty()) {
            insert_header(&mut headers, TENANT_HEADER, tenant);
        }

        if let Some(user_agent) = self.user_agent.as_deref().filter(|u| !u.is_empty()) {
            insert_header(&mut headers, header::USER_AGENT, user_agent);
        }

        let tls = if self.https {
            self.verify_certificate.tls_policy()
        } else {
            TlsPolicy::Verify
        };

        SessionSettings {
            headers,
            timeout: self.timeout,
            tls,
            credentials: self.credentials.clone(),
        }
    }

    /// Open a new session through `transport`
    pub fn open(
        &self,
        transport: &dyn Transport,
        token: Option<&str>,
        tenant: Option<&str>,
    ) -> ClientResult<Session> {
        let settings = self.settings(token, tenant);
        let connection = transport.open(&settings)?;
        Ok(Session {
            settings,
            connection,
        })
    }
}

// Invalid values are skipped rather than failing the whole session.
fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => warn!("Skipping header '{}': value is not a valid header value", name),
    }
}

/// A configured HTTP session
///
/// Sessions are independent: nothing is shared between two sessions opened
/// by the same client, and a session is never reused across calls.
#[derive(Debug)]
pub struct Session {
    settings: SessionSettings,
    connection: Box<dyn Connection>,
}

impl Session {
    /// Settings this session was opened with
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Default headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.settings.headers
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.settings.timeout
    }

    /// Send a request; its own headers take precedence over the defaults
    pub fn send(&self, mut request: HttpRequest) -> ClientResult<HttpResponse> {
        for (name, value) in &self.settings.headers {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }
        self.connection.send(request)
    }

    /// GET `url`
    pub fn get(&self, url: &str) -> ClientResult<HttpResponse> {
        self.send(HttpRequest::new(Method::GET, url))
    }

    /// POST `body` to `url`
    pub fn post(&self, url: &str, body: impl Into<bytes::Bytes>) -> ClientResult<HttpResponse> {
        self.send(HttpRequest::new(Method::POST, url).with_body(body))
    }

    /// PUT `body` to `url`
    pub fn put(&self, url: &str, body: impl Into<bytes::Bytes>) -> ClientResult<HttpResponse> {
        self.send(HttpRequest::new(Method::PUT, url).with_body(body))
    }

    /// DELETE `url`
    pub fn delete(&self, url: &str) -> ClientResult<HttpResponse> {
        self.send(HttpRequest::new(Method::DELETE, url))
    }

    /// HEAD `url`
    pub fn head(&self, url: &str) -> ClientResult<HttpResponse> {
        self.send(HttpRequest::new(Method::HEAD, url))
    }
}
