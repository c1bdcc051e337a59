//! The base client every REST client is built on

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::builder::ClientBuilder;
use super::handle::{ClientHandle, ClientInner};
use crate::config::{ClientConfig, default_user_agent, normalize_prefix};
use crate::error::{ClientError, ClientResult};
use crate::plugins::{Command, CommandSet, PluginCache, bind_commands};
use crate::session::{Session, SessionFactory};
use crate::transport::{Credentials, ReqwestTransport, Transport};

/// A configured client with the commands of its namespace bound by name
///
/// Concrete clients wrap a `BaseClient`, declare their namespace and expose
/// typed accessors over [`command_as`](Self::command_as).
#[derive(Debug)]
pub struct BaseClient {
    handle: ClientHandle,
    commands: CommandSet,
}

impl BaseClient {
    /// Start building a client for `namespace`
    pub fn builder(namespace: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(namespace)
    }

    /// Build a client using the default reqwest transport
    ///
    /// # Errors
    ///
    /// See [`with_transport`](Self::with_transport).
    pub fn new(namespace: &str, config: ClientConfig, plugins: &PluginCache) -> ClientResult<Self> {
        Self::with_transport(namespace, config, plugins, Arc::new(ReqwestTransport::new()))
    }

    /// Build a client on top of `transport`
    ///
    /// The host is validated before anything else, so a missing host never
    /// triggers plugin discovery.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidArgument`] when the host is missing or empty
    /// - [`ClientError::MissingNamespace`] when `namespace` is empty
    /// - [`ClientError::Discovery`] when the discovery backend fails
    /// - any error raised by a command factory
    pub fn with_transport(
        namespace: &str,
        config: ClientConfig,
        plugins: &PluginCache,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        let host = match config.host {
            Some(host) if !host.is_empty() => host,
            _ => return Err(ClientError::invalid_argument("host")),
        };

        if !config.extra.is_empty() {
            debug!(
                "Client for '{}' received unexpected arguments: {:?}",
                namespace,
                config.extra.keys().collect::<Vec<_>>()
            );
        }

        let credentials = match (config.username, config.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials {
                    scheme: config.auth_scheme,
                    username,
                    password,
                })
            }
            _ => None,
        };

        let sessions = SessionFactory::new(
            config.https,
            config.verify_certificate,
            config.timeout,
            config.user_agent.or_else(default_user_agent),
            credentials,
        );

        let handle = ClientHandle::new(ClientInner {
            namespace: namespace.to_string(),
            host,
            port: config.port,
            https: config.https,
            version: config.version.trim_matches('/').to_string(),
            prefix: normalize_prefix(config.prefix.as_deref()),
            token: config.token.into(),
            tenant: config.tenant.into(),
            sessions,
            transport,
        });

        let commands = bind_commands(plugins, namespace, &handle)?;

        Ok(Self { handle, commands })
    }

    /// Shared state handed to commands
    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// Plugin namespace
    pub fn namespace(&self) -> &str {
        self.handle.namespace()
    }

    /// `scheme://host[:port][prefix][/version]`
    pub fn base_url(&self) -> String {
        self.handle.base_url()
    }

    /// The base URL followed by `fragments` joined with `/`
    pub fn url<I>(&self, fragments: I) -> String
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.handle.url(fragments)
    }

    /// Request timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.handle.timeout()
    }

    /// Open a brand-new session
    ///
    /// # Errors
    ///
    /// Fails when the transport cannot set up the session.
    pub fn session(&self) -> ClientResult<Session> {
        self.handle.session()
    }

    /// Current authentication token
    pub fn token(&self) -> Option<String> {
        self.handle.token()
    }

    /// Replace the authentication token for future sessions
    pub fn set_token(&self, token: impl Into<String>) {
        self.handle.set_token(token);
    }

    /// Stop sending `X-Auth-Token`
    pub fn clear_token(&self) {
        self.handle.clear_token();
    }

    /// Current tenant
    pub fn tenant(&self) -> Option<String> {
        self.handle.tenant()
    }

    /// Replace the tenant for future sessions
    pub fn set_tenant(&self, tenant: impl Into<String>) {
        self.handle.set_tenant(tenant);
    }

    /// Stop sending `Wazo-Tenant`
    pub fn clear_tenant(&self) {
        self.handle.clear_tenant();
    }

    /// All bound commands
    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    /// Sorted names of the bound commands
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.names()
    }

    /// The command bound under `name`
    pub fn command(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// The command bound under `name`, if it is a `T`
    pub fn command_as<T: Command>(&self, name: &str) -> Option<Arc<T>> {
        self.commands.get_as(name)
    }

    /// Whether something answering HTTP listens at the base URL
    ///
    /// Sends `HEAD` to the base URL. Any HTTP answer counts, error statuses
    /// included; only transport failures make the server unreachable.
    pub fn is_server_reachable(&self) -> bool {
        let url = self.base_url();
        match self.session().and_then(|session| session.head(&url)) {
            Ok(_) | Err(ClientError::Http(_)) => true,
            Err(e) => {
                debug!("Server unreachable: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::EntryPoints;
    use crate::transport::AuthScheme;
    use pretty_assertions::assert_eq;

    fn client(config: ClientConfig) -> BaseClient {
        let cache = PluginCache::new(EntryPoints::new());
        BaseClient::new("test.commands", config, &cache).unwrap()
    }

    fn config(host: &str, port: Option<u16>, prefix: &str, version: &str, https: bool) -> ClientConfig {
        ClientConfig {
            port,
            prefix: Some(prefix.to_string()),
            version: version.to_string(),
            https,
            ..ClientConfig::new(host)
        }
    }

    #[test]
    fn test_given_connection_parameters_then_url_built() {
        let client = client(config("myhost", Some(1234), "", "1.234", true));
        assert_eq!(client.url(Vec::<String>::new()), "https://myhost:1234/1.234");
        assert_eq!(client.base_url(), "https://myhost:1234/1.234");
    }

    #[test]
    fn test_given_no_https_then_http_used() {
        let client = client(config("myhost", None, "", "", false));
        assert_eq!(client.base_url(), "http://myhost");
    }

    #[test]
    fn test_prefix_with_and_without_leading_slash() {
        let with = client(config("myhost", Some(80), "/api", "1.0", true));
        let without = client(config("myhost", Some(80), "api", "1.0", true));
        assert_eq!(with.base_url(), "https://myhost:80/api/1.0");
        assert_eq!(with.base_url(), without.base_url());
    }

    #[test]
    fn test_missing_segments_do_not_leave_slashes() {
        assert_eq!(
            client(config("myhost", Some(80), "api", "", true)).base_url(),
            "https://myhost:80/api"
        );
        assert_eq!(
            client(config("myhost", Some(80), "", "", true)).base_url(),
            "https://myhost:80"
        );
        assert_eq!(
            client(config("myhost", Some(80), "", "0.1", true)).base_url(),
            "https://myhost:80/0.1"
        );
        assert_eq!(
            client(config("myhost", Some(80), "/", "/0.1/", true)).base_url(),
            "https://myhost:80/0.1"
        );
    }

    #[test]
    fn test_port_zero_is_omitted() {
        assert_eq!(
            client(config("myhost", Some(0), "", "1.0", true)).base_url(),
            "https://myhost/1.0"
        );
    }

    #[test]
    fn test_token_and_tenant_can_be_cleared() {
        let client = client(ClientConfig {
            token: Some("the-one-ring".to_string()),
            tenant: Some("tenant-uuid".to_string()),
            ..ClientConfig::new("localhost")
        });
        assert_eq!(client.token().as_deref(), Some("the-one-ring"));

        client.clear_token();
        client.clear_tenant();

        assert!(client.token().is_none());
        assert!(client.tenant().is_none());
        let settings = client.handle().session_settings();
        assert!(!settings.headers.contains_key(crate::session::AUTH_TOKEN_HEADER));
        assert!(!settings.headers.contains_key(crate::session::TENANT_HEADER));
    }

    #[test]
    fn test_fragments_appended() {
        let client = client(config("myhost", None, "", "1.0", true));
        assert_eq!(client.url(["resource"]), "https://myhost/1.0/resource");
        assert_eq!(client.url(["users", "12", "lines"]), "https://myhost/1.0/users/12/lines");
        assert_eq!(client.url([12]), "https://myhost/1.0/12");
    }

    #[test]
    fn test_empty_host_rejected() {
        let cache = PluginCache::new(EntryPoints::new());
        let err = BaseClient::new("test.commands", ClientConfig::new(""), &cache).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument { argument: "host" }));

        let err = BaseClient::new("test.commands", ClientConfig::default(), &cache).unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument { argument: "host" }));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let cache = PluginCache::new(EntryPoints::new());
        let err = BaseClient::new("", ClientConfig::new("localhost"), &cache).unwrap_err();
        assert!(matches!(err, ClientError::MissingNamespace));
    }

    #[test]
    fn test_user_agent_defaults_to_program_name() {
        let settings = client(ClientConfig::new("localhost")).handle().session_settings();
        assert!(settings.headers.contains_key(http::header::USER_AGENT));
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let mut config = ClientConfig::new("localhost");
        config.username = Some("alice".to_string());
        let settings = client(config).handle().session_settings();
        assert!(settings.credentials.is_none());

        let mut config = ClientConfig::new("localhost");
        config.username = Some("alice".to_string());
        config.password = Some("secret".to_string());
        let settings = client(config).handle().session_settings();
        let credentials = settings.credentials.unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.scheme, AuthScheme::Basic);
    }
}
