//! Plugin registry service
//!
//! Maps the plugin names used by expectation tables to decoder plugins.

use crate::domain::repositories::ImagePlugin;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of decoder plugins, keyed by [`ImagePlugin::name`]
///
/// # Example
///
/// ```ignore
/// let mut registry = PluginRegistry::new();
/// registry.register(Arc::new(RawImagePlugin::raw()));
/// assert!(registry.get("raw").is_some());
/// ```
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, Arc<dyn ImagePlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, replacing any previous plugin with the same name
    pub fn register(&mut self, plugin: Arc<dyn ImagePlugin>) {
        self.plugins.insert(plugin.name(), plugin);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ImagePlugin>> {
        self.plugins.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
