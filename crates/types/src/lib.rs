//! nvsmi-types: Shared data types for nvsmi-collect.
//!
//! This crate contains pure data types (metric types, field metadata,
//! samples and host configuration items) shared by the plugin contract,
//! the plugins themselves and the host binary.

pub mod config_item;
pub mod field;
pub mod sample;

// Re-export commonly used types at the crate root for convenience
pub use config_item::ConfigItem;
pub use field::{FieldMetadata, MetricType};
pub use sample::Sample;
