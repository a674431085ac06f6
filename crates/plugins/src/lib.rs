//! nvsmi-plugins: Plugin implementations for nvsmi-collect.
//!
//! - `nvsmi`: reads GPU metrics from `nvidia-smi --query-gpu`
//! - `write_info`: debug writer that logs every dispatched sample

pub mod nvsmi;
mod write_info;

pub use nvsmi::{NvsmiError, NvsmiPlugin, ReadOutcome, Reading, PLUGIN_NAME};
pub use write_info::{WriteInfo, WRITE_INFO_NAME};

use nvsmi_core::Registry;

/// Register all built-in plugins with a registry
pub fn register_all(registry: &mut Registry) {
    registry.register_read(
        PLUGIN_NAME,
        "GPU metrics from nvidia-smi --query-gpu",
        || Box::new(NvsmiPlugin::new()),
    );

    registry.register_write(
        WRITE_INFO_NAME,
        "Logs every dispatched sample (debugging)",
        || Box::new(WriteInfo::new()),
    );
}
