//! Plugin traits and related types

use crate::dispatcher::Dispatcher;
use anyhow::Result;
use nvsmi_types::{ConfigItem, Sample};
use serde::{Deserialize, Serialize};

/// Metadata about a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin name, also the name of its configuration block
    pub name: String,
    /// Plugin version
    pub version: String,
    /// Description of what this plugin provides
    pub description: String,
}

/// Trait for plugins that produce samples
///
/// The host calls `configure` once with the declarations of the plugin's
/// configuration block, then calls `read` once per cycle. Cycles never
/// overlap, so `read` only needs shared access to the configuration it
/// resolved.
pub trait ReadPlugin: Send + Sync {
    /// Get metadata about this plugin
    fn metadata(&self) -> &PluginMetadata;

    /// Apply the ordered declarations of this plugin's configuration block
    ///
    /// Calling this again replaces the previous configuration entirely.
    fn configure(&mut self, items: &[ConfigItem]) -> Result<()>;

    /// Run one read cycle, dispatching every collected sample
    ///
    /// An error aborts the cycle. Samples dispatched before the error have
    /// already reached the writers, so plugins must finish all fallible work
    /// before dispatching.
    fn read(&self, dispatcher: &dyn Dispatcher) -> Result<()>;
}

/// Trait for plugins that consume samples
pub trait WritePlugin: Send + Sync {
    /// Get metadata about this plugin
    fn metadata(&self) -> &PluginMetadata;

    /// Receive one dispatched sample
    fn write(&self, sample: &Sample) -> Result<()>;
}

/// Type-erased read plugin for dynamic dispatch
pub type BoxedReadPlugin = Box<dyn ReadPlugin>;

/// Type-erased write plugin for dynamic dispatch
pub type BoxedWritePlugin = Box<dyn WritePlugin>;
