//! A minimal concrete client and command
//!
//! Used by the demo binary and the tests; also the smallest complete
//! illustration of how a service client is put together on top of
//! [`BaseClient`].

use bytes::Bytes;
use std::ops::Deref;
use std::sync::Arc;

use crate::client::{BaseClient, ClientBuilder};
use crate::command::{RestCommand, RestCommandBase};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::plugins::{Command, EntryPoints, PluginCache};

/// GETs the `test` resource
#[derive(Debug)]
pub struct ExampleCommand {
    base: RestCommandBase,
}

impl Command for ExampleCommand {}

impl RestCommand for ExampleCommand {
    const RESOURCE: &'static str = "test";

    fn from_base(base: RestCommandBase) -> Self {
        Self { base }
    }
}

impl ExampleCommand {
    /// URL of the `test` resource
    pub fn base_url(&self) -> &str {
        self.base.base_url()
    }

    /// GET the resource and return the raw body, whatever the status
    ///
    /// # Errors
    ///
    /// Transport failures only.
    pub fn test(&self) -> ClientResult<Bytes> {
        let session = self.base.session()?;
        let response = session.get(self.base.base_url())?;
        Ok(response.content().clone())
    }

    /// Same as [`test`](Self::test)
    ///
    /// # Errors
    ///
    /// See [`test`](Self::test).
    pub fn call(&self) -> ClientResult<Bytes> {
        self.test()
    }
}

/// Client of the example namespace
#[derive(Debug)]
pub struct ExampleClient {
    base: BaseClient,
}

impl ExampleClient {
    /// Namespace the example commands are registered under
    pub const NAMESPACE: &'static str = "test_rest_client.commands";

    /// Name [`ExampleCommand`] is registered under by [`register`](Self::register)
    pub const EXAMPLE: &'static str = "example";

    /// Register [`ExampleCommand`] in `entry_points`
    pub fn register(entry_points: &EntryPoints) {
        entry_points.register_rest::<ExampleCommand>(Self::NAMESPACE, Self::EXAMPLE);
    }

    /// A builder preset with the example namespace
    pub fn builder() -> ClientBuilder {
        BaseClient::builder(Self::NAMESPACE)
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// See [`BaseClient::with_transport`].
    pub fn new(config: ClientConfig, plugins: &PluginCache) -> ClientResult<Self> {
        BaseClient::new(Self::NAMESPACE, config, plugins).map(Self::from)
    }

    /// The bound [`ExampleCommand`], if one was registered
    pub fn example(&self) -> Option<Arc<ExampleCommand>> {
        self.base.command_as(Self::EXAMPLE)
    }
}

impl From<BaseClient> for ExampleClient {
    fn from(base: BaseClient) -> Self {
        Self { base }
    }
}

impl Deref for ExampleClient {
    type Target = BaseClient;

    fn deref(&self) -> &BaseClient {
        &self.base
    }
}
