//! Building blocks for commands
//!
//! [`HttpCommand`] gives a command access to fresh sessions of its client.
//! [`RestCommandBase`] adds the resource URL and timeout computed once when
//! the command is built. Concrete commands implement [`RestCommand`] to
//! declare their resource and become registrable as plugins.

use http::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::warn;

use crate::client::ClientHandle;
use crate::error::{ClientError, ClientResult};
use crate::plugins::Command;
use crate::session::{Session, TENANT_HEADER};
use crate::transport::HttpResponse;

/// Extract the `message` field of a JSON error body
///
/// Returns `None` when the body is not JSON, not an object, has no
/// `message` key, or the message is not a string.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("message")?.as_str().map(str::to_owned)
}

/// Session access shared by every command
#[derive(Debug, Clone)]
pub struct HttpCommand {
    client: ClientHandle,
}

impl HttpCommand {
    /// Create a command bound to `client`
    pub fn new(client: &ClientHandle) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// The owning client
    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// A brand-new session from the client
    pub fn session(&self) -> ClientResult<Session> {
        self.client.session()
    }

    /// Fail on a 4xx/5xx response, using the body's `message` as the reason
    ///
    /// Any response is first inspected for a JSON `message`; when present it
    /// replaces the reason. Then the response is passed through unchanged if
    /// its status is not an error.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] for 4xx and 5xx statuses.
    pub fn raise_from_response(mut response: HttpResponse) -> ClientResult<HttpResponse> {
        if let Some(message) = error_message(response.content()) {
            response.set_reason(message);
        }
        Ok(response.error_for_status()?)
    }
}

/// Common state of REST commands
#[derive(Debug, Clone)]
pub struct RestCommandBase {
    http: HttpCommand,
    base_url: String,
    timeout: Option<Duration>,
}

impl RestCommandBase {
    /// Compute the base URL of `resource` on `client`
    ///
    /// `command` names the concrete command in the error raised when
    /// `resource` is empty.
    pub fn new(client: &ClientHandle, resource: &str, command: &str) -> ClientResult<Self> {
        if resource.is_empty() {
            return Err(ClientError::missing_resource(command));
        }
        Ok(Self {
            http: HttpCommand::new(client),
            base_url: client.url([resource]),
            timeout: client.timeout(),
        })
    }

    /// URL of the resource, fixed at construction
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client timeout at construction
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The owning client
    pub fn client(&self) -> &ClientHandle {
        self.http.client()
    }

    /// A brand-new session from the client
    pub fn session(&self) -> ClientResult<Session> {
        self.http.session()
    }

    /// Per-request headers: `Accept: application/json`, plus `Wazo-Tenant`
    /// when a tenant override is given
    ///
    /// The client's own tenant already travels as a session header; only an
    /// explicit override appears here.
    pub fn headers(&self, tenant: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(tenant) = tenant {
            match HeaderValue::from_str(tenant) {
                Ok(value) => {
                    headers.insert(TENANT_HEADER, value);
                }
                Err(_) => warn!("Ignoring tenant override: not a valid header value"),
            }
        }
        headers
    }
}

/// A command targeting one REST resource
///
/// # Examples
///
/// ```rust
/// use wazo_rest_client::{ClientResult, Command, RestCommand, RestCommandBase};
///
/// #[derive(Debug)]
/// struct UsersCommand {
///     base: RestCommandBase,
/// }
///
/// impl Command for UsersCommand {}
///
/// impl RestCommand for UsersCommand {
///     const RESOURCE: &'static str = "users";
///
///     fn from_base(base: RestCommandBase) -> Self {
///         Self { base }
///     }
/// }
///
/// impl UsersCommand {
///     fn list(&self) -> ClientResult<serde_json::Value> {
///         let session = self.base.session()?;
///         let request = wazo_rest_client::HttpRequest::new(http::Method::GET, self.base.base_url())
///             .with_headers(self.base.headers(None));
///         let response = wazo_rest_client::HttpCommand::raise_from_response(session.send(request)?)?;
///         response.json()
///     }
/// }
/// ```
pub trait RestCommand: Command + Sized {
    /// Path segment of the resource, e.g. `"users"`
    const RESOURCE: &'static str;

    /// Wrap the computed base state
    fn from_base(base: RestCommandBase) -> Self;

    /// Build the command for `client`
    ///
    /// # Errors
    ///
    /// [`ClientError::MissingResource`] when [`RESOURCE`](Self::RESOURCE) is empty.
    fn new(client: &ClientHandle) -> ClientResult<Self> {
        RestCommandBase::new(client, Self::RESOURCE, std::any::type_name::<Self>())
            .map(Self::from_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(br#"{"message": "Expected reason"}"#).as_deref(),
            Some("Expected reason")
        );
        assert_eq!(error_message(b"not a dict with message"), None);
        assert_eq!(error_message(br#"{"error": "x"}"#), None);
        assert_eq!(error_message(br#"["message"]"#), None);
        assert_eq!(error_message(br#"{"message": 42}"#), None);
        assert_eq!(error_message(b""), None);
        assert_eq!(error_message(&[0xff, 0xfe]), None);
    }
}
