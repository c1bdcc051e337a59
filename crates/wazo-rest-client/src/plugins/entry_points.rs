//! In-process discovery backend
//!
//! Plugins are registered explicitly under a namespace, typically once at
//! startup, and discovered in registration order.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Command, DiscoveryResult, PluginDescriptor, PluginDiscovery};
use crate::client::ClientHandle;
use crate::command::RestCommand;
use crate::error::ClientResult;

/// Registry of plugins grouped by namespace
///
/// # Examples
///
/// ```rust
/// use wazo_rest_client::{EntryPoints, ExampleCommand, PluginDiscovery};
///
/// let entry_points = EntryPoints::new();
/// entry_points.register_rest::<ExampleCommand>("test_rest_client.commands", "example");
///
/// let plugins = entry_points.discover("test_rest_client.commands").unwrap();
/// assert_eq!(plugins[0].name(), "example");
/// assert!(entry_points.discover("unknown").unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct EntryPoints {
    namespaces: RwLock<HashMap<String, Vec<PluginDescriptor>>>,
}

impl EntryPoints {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under `namespace`
    pub fn register(&self, namespace: impl Into<String>, plugin: PluginDescriptor) {
        self.namespaces
            .write()
            .entry(namespace.into())
            .or_default()
            .push(plugin);
    }

    /// Register a factory closure under `namespace` and `name`
    pub fn register_fn<F>(&self, namespace: impl Into<String>, name: impl Into<String>, factory: F)
    where
        F: Fn(&ClientHandle) -> ClientResult<Arc<dyn Command>> + Send + Sync + 'static,
    {
        self.register(namespace, PluginDescriptor::new(name, factory));
    }

    /// Register the REST command `C` under `namespace` and `name`
    pub fn register_rest<C: RestCommand>(&self, namespace: impl Into<String>, name: impl Into<String>) {
        self.register(namespace, PluginDescriptor::rest::<C>(name));
    }

    /// Builder form of [`register_rest`](Self::register_rest)
    pub fn with_rest<C: RestCommand>(self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.register_rest::<C>(namespace, name);
        self
    }

    /// Number of plugins registered under `namespace`
    pub fn count(&self, namespace: &str) -> usize {
        self.namespaces.read().get(namespace).map_or(0, Vec::len)
    }
}

impl PluginDiscovery for EntryPoints {
    fn discover(&self, namespace: &str) -> DiscoveryResult {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }
}
