//! Plugin discovery and command binding
//!
//! Commands are not hard-wired into a client. Each client type declares a
//! namespace; a [`PluginDiscovery`] backend maps that namespace to named
//! [`PluginDescriptor`]s, and the client instantiates one command per
//! descriptor when it is built.
//!
//! ## Architecture
//!
//! ```text
//! BaseClient::build ─→ PluginCache::resolve(namespace) ─→ PluginDiscovery (once per namespace)
//!        │                        │
//!        └──── bind_commands ←────┘  factory(&ClientHandle) for each descriptor
//! ```
//!
//! ## Core Components
//!
//! - **Command**: marker trait for anything bound onto a client
//! - **PluginDiscovery**: backend answering "which plugins live in this namespace"
//! - **PluginCache**: remembers each namespace's answer for the life of the cache
//! - **EntryPoints**: in-process discovery backend fed by explicit registrations
//! - **CommandSet**: the name → command mapping held by a client

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::client::ClientHandle;
use crate::command::RestCommand;
use crate::error::ClientResult;

mod binder;
mod cache;
mod entry_points;

pub use binder::CommandSet;
pub(crate) use binder::bind_commands;
pub use cache::PluginCache;
pub use entry_points::EntryPoints;

/// Upcast helper so bound commands can be downcast to their concrete type
pub trait AsAny: Any + Send + Sync {
    /// Convert into a type-erased `Arc`
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A unit of behavior bound onto a client under a plugin name
pub trait Command: AsAny + fmt::Debug {}

/// Builds a command for a client
pub type CommandFactory = Arc<dyn Fn(&ClientHandle) -> ClientResult<Arc<dyn Command>> + Send + Sync>;

/// Result of a discovery query
pub type DiscoveryResult = Result<Vec<PluginDescriptor>, Box<dyn std::error::Error + Send + Sync>>;

/// A named command factory as returned by discovery
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    factory: CommandFactory,
}

impl PluginDescriptor {
    /// Create a descriptor from a name and a factory closure
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ClientHandle) -> ClientResult<Arc<dyn Command>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Create a descriptor building the REST command `C`
    pub fn rest<C: RestCommand>(name: impl Into<String>) -> Self {
        Self::new(name, |client| {
            let command: Arc<dyn Command> = Arc::new(C::new(client)?);
            Ok(command)
        })
    }

    /// Name the command is bound under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the command for `client`
    pub fn instantiate(&self, client: &ClientHandle) -> ClientResult<Arc<dyn Command>> {
        (self.factory)(client)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Backend answering which plugins are registered in a namespace
///
/// A namespace without plugins is a normal outcome and must be reported as
/// an empty list, not an error. Errors are reserved for backend failures.
pub trait PluginDiscovery: Send + Sync + fmt::Debug {
    /// List the plugins of `namespace` in registration order
    fn discover(&self, namespace: &str) -> DiscoveryResult;
}
