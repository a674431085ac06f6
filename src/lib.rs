//! nvsmi-collect: GPU metrics from nvidia-smi, republished as labeled samples
//!
//! This library provides the host side of nvsmi-collect:
//! - Configuration loading
//! - The plugin host that configures plugins and fans samples out to writers
//! - The scheduler that drives read cycles

pub mod config;
pub mod core;

// Re-export commonly used types
pub use config::{AppConfig, PluginConfig};
pub use core::{CycleSummary, PluginHost, UpdateManager};
