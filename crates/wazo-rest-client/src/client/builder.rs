//! Client builder pattern for client construction
//!
//! Provides a fluent interface for configuring client options before creation.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::base::BaseClient;
use crate::config::{ClientConfig, VerifyCertificate};
use crate::error::ClientResult;
use crate::plugins::PluginCache;
use crate::transport::{AuthScheme, ReqwestTransport, Transport};

/// Builder for configuring and creating clients
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
/// use wazo_rest_client::{BaseClient, EntryPoints, ExampleCommand, PluginCache};
///
/// # fn example() -> wazo_rest_client::ClientResult<()> {
/// let cache = PluginCache::new(
///     EntryPoints::new().with_rest::<ExampleCommand>("test_rest_client.commands", "example"),
/// );
///
/// let client = BaseClient::builder("test_rest_client.commands")
///     .with_host("wazo.example.com")
///     .with_port(9486)
///     .with_version("1.0")
///     .with_token("the-one-ring")
///     .with_timeout(Some(Duration::from_secs(30)))
///     .build(&cache)?;
///
/// let body = client.command_as::<ExampleCommand>("example").unwrap().test()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    namespace: String,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a builder for a client of `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            config: ClientConfig::default(),
            transport: None,
        }
    }

    /// Replace every option with `config`
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the server host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    /// Set the server port
    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    /// Set the API version segment
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Set the tenant
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.config.tenant = Some(tenant.into());
        self
    }

    /// Use `https` (`true`, the default) or `http`
    pub fn with_https(mut self, https: bool) -> Self {
        self.config.https = https;
        self
    }

    /// Set the request timeout; `None` disables it
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set certificate validation: a flag or a CA bundle path
    pub fn with_verify_certificate(mut self, verify: impl Into<VerifyCertificate>) -> Self {
        self.config.verify_certificate = verify.into();
        self
    }

    /// Set the path prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    /// Set the `User-Agent` header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Send basic-auth credentials with every request
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self.config.auth_scheme = AuthScheme::Basic;
        self
    }

    /// Answer digest-auth challenges with these credentials
    pub fn with_digest_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self.config.auth_scheme = AuthScheme::Digest;
        self
    }

    /// Pass an option this client does not know about
    ///
    /// Unknown options are accepted and logged at debug level.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.extra.insert(key.into(), value.into());
        self
    }

    /// Use `transport` instead of the default reqwest backend
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client and bind the commands of its namespace
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidArgument`](crate::ClientError::InvalidArgument) when no host is set
    /// - [`ClientError::MissingNamespace`](crate::ClientError::MissingNamespace) when the namespace is empty
    /// - [`ClientError::Discovery`](crate::ClientError::Discovery) when the discovery backend fails
    /// - any error raised by a command factory
    pub fn build(self, plugins: &PluginCache) -> ClientResult<BaseClient> {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        BaseClient::with_transport(&self.namespace, self.config, plugins, transport)
    }
}
