//! Registry for read and write plugins

use crate::plugin::{BoxedReadPlugin, BoxedWritePlugin};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Function that creates a read plugin
pub type ReadFactory = fn() -> BoxedReadPlugin;

/// Function that creates a write plugin
pub type WriteFactory = fn() -> BoxedWritePlugin;

/// Registration info shown when listing plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub id: String,
    pub description: String,
}

/// Registry for read and write plugins
///
/// Built-in plugins register themselves at startup; the host then creates
/// instances by the name used in the configuration file. Lookups ignore case,
/// the way the host treats configuration keys.
pub struct Registry {
    reads: HashMap<String, (PluginInfo, ReadFactory)>,
    writes: HashMap<String, (PluginInfo, WriteFactory)>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            reads: HashMap::new(),
            writes: HashMap::new(),
        }
    }

    /// Register a read plugin
    pub fn register_read(&mut self, id: &str, description: &str, factory: ReadFactory) {
        let info = PluginInfo {
            id: id.to_string(),
            description: description.to_string(),
        };
        self.reads.insert(id.to_ascii_lowercase(), (info, factory));
    }

    /// Register a write plugin
    pub fn register_write(&mut self, id: &str, description: &str, factory: WriteFactory) {
        let info = PluginInfo {
            id: id.to_string(),
            description: description.to_string(),
        };
        self.writes.insert(id.to_ascii_lowercase(), (info, factory));
    }

    /// Create a read plugin by ID
    pub fn create_read(&self, id: &str) -> Result<BoxedReadPlugin> {
        let (_, factory) = self
            .reads
            .get(&id.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("Unknown read plugin: {}", id))?;
        Ok(factory())
    }

    /// Create a write plugin by ID
    pub fn create_write(&self, id: &str) -> Result<BoxedWritePlugin> {
        let (_, factory) = self
            .writes
            .get(&id.to_ascii_lowercase())
            .ok_or_else(|| anyhow!("Unknown write plugin: {}", id))?;
        Ok(factory())
    }

    /// Check whether a read plugin is registered under this ID
    pub fn has_read(&self, id: &str) -> bool {
        self.reads.contains_key(&id.to_ascii_lowercase())
    }

    /// List all registered read plugins, sorted by ID
    pub fn list_reads(&self) -> Vec<PluginInfo> {
        let mut infos: Vec<PluginInfo> = self.reads.values().map(|(i, _)| i.clone()).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// List all registered write plugins, sorted by ID
    pub fn list_writes(&self) -> Vec<PluginInfo> {
        let mut infos: Vec<PluginInfo> = self.writes.values().map(|(i, _)| i.clone()).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::plugin::{PluginMetadata, ReadPlugin};
    use nvsmi_types::ConfigItem;

    struct NullPlugin {
        metadata: PluginMetadata,
    }

    impl ReadPlugin for NullPlugin {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }

        fn configure(&mut self, _items: &[ConfigItem]) -> Result<()> {
            Ok(())
        }

        fn read(&self, _dispatcher: &dyn Dispatcher) -> Result<()> {
            Ok(())
        }
    }

    fn null_plugin() -> BoxedReadPlugin {
        Box::new(NullPlugin {
            metadata: PluginMetadata {
                name: "null".to_string(),
                version: "0".to_string(),
                description: "does nothing".to_string(),
            },
        })
    }

    #[test]
    fn test_create_read_ignores_case() {
        let mut registry = Registry::new();
        registry.register_read("Null", "does nothing", null_plugin);

        assert!(registry.has_read("null"));
        let plugin = registry.create_read("NULL").unwrap();
        assert_eq!(plugin.metadata().name, "null");
        assert_eq!(registry.list_reads()[0].id, "Null");
    }

    #[test]
    fn test_unknown_plugin_is_an_error() {
        let registry = Registry::new();
        assert!(registry.create_read("missing").is_err());
        assert!(registry.create_write("missing").is_err());
        assert!(registry.list_writes().is_empty());
    }
}
