//! Binding discovered plugins onto a client

use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Command, PluginCache};
use crate::client::ClientHandle;
use crate::error::{ClientError, ClientResult};

/// Commands bound onto one client, keyed by plugin name
///
/// Filled once while the client is built and never modified afterwards.
#[derive(Debug, Default, Clone)]
pub struct CommandSet {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandSet {
    /// The command bound under `name`
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// The command bound under `name`, if it is a `T`
    pub fn get_as<T: Command>(&self, name: &str) -> Option<Arc<T>> {
        let command = Arc::clone(self.commands.get(name)?);
        command.into_any().downcast::<T>().ok()
    }

    /// Whether a command is bound under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Bound names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of bound commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is bound
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over `(name, command)` pairs in no particular order
    pub fn iter(&self) -> hash_map::Iter<'_, String, Arc<dyn Command>> {
        self.commands.iter()
    }
}

/// Resolve `namespace` through `cache` and build one command per plugin
///
/// Plugins are instantiated in discovery order; a later plugin with the same
/// name replaces the earlier binding.
pub(crate) fn bind_commands(
    cache: &PluginCache,
    namespace: &str,
    client: &ClientHandle,
) -> ClientResult<CommandSet> {
    if namespace.is_empty() {
        return Err(ClientError::MissingNamespace);
    }

    let plugins = cache.resolve(namespace)?;
    let mut set = CommandSet::default();

    if plugins.is_empty() {
        warn!("No commands found");
        return Ok(set);
    }

    for plugin in plugins.iter() {
        let command = plugin.instantiate(client)?;
        debug!("Bound command '{}' from namespace '{}'", plugin.name(), namespace);
        set.commands.insert(plugin.name().to_string(), command);
    }

    Ok(set)
}
