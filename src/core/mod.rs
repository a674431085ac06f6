//! Plugin host and read scheduling

mod host;
mod update_manager;

pub use host::{CycleSummary, PluginHost};
pub use update_manager::UpdateManager;
