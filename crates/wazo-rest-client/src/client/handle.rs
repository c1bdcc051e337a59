//! Shared client state
//!
//! Commands outlive nothing: they hold a [`ClientHandle`] pointing at the same
//! state as their client, so token and tenant changes made through the
//! client are visible to every command's next session.

use parking_lot::RwLock;
use std::fmt::{Display, Write as _};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientResult;
use crate::session::{Session, SessionFactory};
use crate::transport::{SessionSettings, Transport};

#[derive(Debug)]
pub(crate) struct ClientInner {
    pub(crate) namespace: String,
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
    pub(crate) https: bool,
    pub(crate) version: String,
    pub(crate) prefix: String,
    pub(crate) token: RwLock<Option<String>>,
    pub(crate) tenant: RwLock<Option<String>>,
    pub(crate) sessions: SessionFactory,
    pub(crate) transport: Arc<dyn Transport>,
}

/// Cheap, clonable reference to a client's state
#[derive(Debug, Clone)]
pub struct ClientHandle {
    inner: Arc<ClientInner>,
}

impl ClientHandle {
    pub(crate) fn new(inner: ClientInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Plugin namespace of the client
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Server host
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Server port
    pub fn port(&self) -> Option<u16> {
        self.inner.port
    }

    /// `"https"` or `"http"`
    pub fn scheme(&self) -> &'static str {
        if self.inner.https { "https" } else { "http" }
    }

    /// API version segment, possibly empty
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Normalized path prefix, possibly empty
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Request timeout; `None` means no timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.sessions.timeout()
    }

    /// `scheme://host[:port][prefix][/version]`; port 0 is left out
    pub fn base_url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme(), self.inner.host);
        if let Some(port) = self.inner.port.filter(|port| *port != 0) {
            let _ = write!(url, ":{port}");
        }
        url.push_str(&self.inner.prefix);
        if !self.inner.version.is_empty() {
            url.push('/');
            url.push_str(&self.inner.version);
        }
        url
    }

    /// The base URL followed by `fragments` joined with `/`
    ///
    /// Fragments are inserted verbatim; callers pass URL-safe values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use wazo_rest_client::{BaseClient, EntryPoints, PluginCache};
    /// let cache = PluginCache::new(EntryPoints::new());
    /// let client = BaseClient::builder("docs.commands")
    ///     .with_host("myhost")
    ///     .with_port(9486)
    ///     .with_version("1.0")
    ///     .build(&cache)
    ///     .unwrap();
    ///
    /// assert_eq!(client.url(["users", "42"]), "https://myhost:9486/1.0/users/42");
    /// assert_eq!(client.url([7]), "https://myhost:9486/1.0/7");
    /// ```
    pub fn url<I>(&self, fragments: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut url = self.base_url();
        for fragment in fragments {
            let _ = write!(url, "/{fragment}");
        }
        url
    }

    /// Current authentication token
    pub fn token(&self) -> Option<String> {
        self.inner.token.read().clone()
    }

    /// Replace the authentication token for future sessions
    pub fn set_token(&self, token: impl Into<String>) {
        *self.inner.token.write() = Some(token.into());
    }

    /// Stop sending an authentication token
    pub fn clear_token(&self) {
        *self.inner.token.write() = None;
    }

    /// Current tenant
    pub fn tenant(&self) -> Option<String> {
        self.inner.tenant.read().clone()
    }

    /// Replace the tenant for future sessions
    pub fn set_tenant(&self, tenant: impl Into<String>) {
        *self.inner.tenant.write() = Some(tenant.into());
    }

    /// Stop sending a tenant
    pub fn clear_tenant(&self) {
        *self.inner.tenant.write() = None;
    }

    /// Settings the next session will be opened with
    pub fn session_settings(&self) -> SessionSettings {
        let token = self.token();
        let tenant = self.tenant();
        self.inner
            .sessions
            .settings(token.as_deref(), tenant.as_deref())
    }

    /// Open a brand-new session
    ///
    /// # Errors
    ///
    /// Fails when the transport cannot set up the session, e.g. an
    /// unreadable CA bundle.
    pub fn session(&self) -> ClientResult<Session> {
        let token = self.token();
        let tenant = self.tenant();
        self.inner.sessions.open(
            self.inner.transport.as_ref(),
            token.as_deref(),
            tenant.as_deref(),
        )
    }
}
