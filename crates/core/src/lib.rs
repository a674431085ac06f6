//! nvsmi-core: Plugin traits and registry for nvsmi-collect.
//!
//! This crate contains the host/plugin contract (ReadPlugin, WritePlugin,
//! Dispatcher), the plugin Registry, and shared constants.

pub mod constants;
mod dispatcher;
mod plugin;
mod registry;

pub use constants::{DEFAULT_INTERVAL, DEFAULT_INTERVAL_MS};
pub use dispatcher::{Dispatcher, RecordingDispatcher};
pub use plugin::{BoxedReadPlugin, BoxedWritePlugin, PluginMetadata, ReadPlugin, WritePlugin};
pub use registry::{PluginInfo, ReadFactory, Registry, WriteFactory};

// Re-export types used in trait signatures for convenience
pub use nvsmi_types::{ConfigItem, MetricType, Sample};
