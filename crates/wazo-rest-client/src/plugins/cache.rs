//! Namespace-keyed cache of discovery results
//!
//! Each namespace moves from unresolved to resolved exactly once: the first
//! client built for it queries the discovery backend, every later client
//! reuses the stored list. A failed query leaves the namespace unresolved.
//!
//! Every namespace has its own lock, so concurrent construction of clients
//! for the same namespace waits for a single query instead of racing, while
//! other namespaces proceed independently.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{PluginDescriptor, PluginDiscovery};
use crate::error::{ClientError, ClientResult};

type Slot = Arc<Mutex<Option<Arc<[PluginDescriptor]>>>>;

/// Process-wide plugin cache
///
/// Construct one at startup and pass it to every client builder.
///
/// # Examples
///
/// ```rust
/// use wazo_rest_client::{EntryPoints, ExampleCommand, PluginCache};
///
/// let entry_points = EntryPoints::new()
///     .with_rest::<ExampleCommand>("test_rest_client.commands", "example");
/// let cache = PluginCache::new(entry_points);
///
/// let plugins = cache.resolve("test_rest_client.commands").unwrap();
/// assert_eq!(plugins.len(), 1);
/// assert!(cache.is_resolved("test_rest_client.commands"));
/// ```
pub struct PluginCache {
    discovery: Arc<dyn PluginDiscovery>,
    namespaces: Mutex<HashMap<String, Slot>>,
}

impl PluginCache {
    /// Create an empty cache in front of `discovery`
    pub fn new(discovery: impl PluginDiscovery + 'static) -> Self {
        Self::with_discovery(Arc::new(discovery))
    }

    /// Create an empty cache in front of a shared discovery backend
    pub fn with_discovery(discovery: Arc<dyn PluginDiscovery>) -> Self {
        Self {
            discovery,
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    /// Plugins of `namespace`, querying the backend on first use
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Discovery`] when the backend fails. Nothing is
    /// cached in that case, so a later call queries the backend again.
    pub fn resolve(&self, namespace: &str) -> ClientResult<Arc<[PluginDescriptor]>> {
        let slot = {
            let mut namespaces = self.namespaces.lock();
            Arc::clone(namespaces.entry(namespace.to_string()).or_default())
        };

        let mut resolved = slot.lock();
        if let Some(plugins) = resolved.as_ref() {
            debug!(
                "Namespace '{}' served from cache ({} plugins)",
                namespace,
                plugins.len()
            );
            return Ok(Arc::clone(plugins));
        }

        debug!("Querying plugin discovery for namespace '{}'", namespace);
        let plugins: Arc<[PluginDescriptor]> = self
            .discovery
            .discover(namespace)
            .map_err(|e| ClientError::discovery(namespace, e))?
            .into();

        debug!(
            "Namespace '{}' resolved to {} plugins",
            namespace,
            plugins.len()
        );
        *resolved = Some(Arc::clone(&plugins));
        Ok(plugins)
    }

    /// Whether `namespace` has been resolved
    pub fn is_resolved(&self, namespace: &str) -> bool {
        let slot = self.namespaces.lock().get(namespace).cloned();
        slot.is_some_and(|slot| slot.lock().is_some())
    }

    /// Names of every resolved namespace, sorted
    pub fn resolved_namespaces(&self) -> Vec<String> {
        let slots: Vec<(String, Slot)> = self
            .namespaces
            .lock()
            .iter()
            .map(|(name, slot)| (name.clone(), Arc::clone(slot)))
            .collect();
        let mut names: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_some())
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names
    }
}

impl fmt::Debug for PluginCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCache")
            .field("discovery", &self.discovery)
            .field("resolved", &self.resolved_namespaces())
            .finish()
    }
}
