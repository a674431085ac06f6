//! Metric samples handed from read plugins to the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::MetricType;

/// One published value
///
/// Mirrors the identifier layout of the monitoring host:
/// `host/plugin-plugin_instance/type-type_instance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Host name, stamped by the host at dispatch time when empty
    #[serde(default)]
    pub host: String,
    /// Name of the plugin that produced the sample
    pub plugin: String,
    /// Plugin-specific instance, e.g. the device identity
    pub plugin_instance: String,
    /// Metric type classification
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Metric label, e.g. the queried field name
    pub type_instance: String,
    /// Values, already normalized to strings
    pub values: Vec<String>,
    /// Collection time, stamped by the host at dispatch time when unset
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl Sample {
    /// Create a single-valued sample with host and time left for the host to fill in
    pub fn new(
        plugin: impl Into<String>,
        plugin_instance: impl Into<String>,
        metric_type: MetricType,
        type_instance: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            host: String::new(),
            plugin: plugin.into(),
            plugin_instance: plugin_instance.into(),
            metric_type,
            type_instance: type_instance.into(),
            values: vec![value.into()],
            time: None,
        }
    }

    /// Identifier in `plugin-instance/type-type_instance` form
    pub fn identifier(&self) -> String {
        format!(
            "{}-{}/{}-{}",
            self.plugin, self.plugin_instance, self.metric_type, self.type_instance
        )
    }
}
