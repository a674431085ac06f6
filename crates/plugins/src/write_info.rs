//! Debug writer that logs the full representation of every sample

use anyhow::Result;
use log::info;
use nvsmi_core::{PluginMetadata, Sample, WritePlugin};

pub const WRITE_INFO_NAME: &str = "write_info";

/// Logs each dispatched sample as JSON at info level
///
/// Purely observational; run with `-d 1` (or `RUST_LOG=info`) to see it.
pub struct WriteInfo {
    metadata: PluginMetadata,
}

impl WriteInfo {
    pub fn new() -> Self {
        Self {
            metadata: PluginMetadata {
                name: WRITE_INFO_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "Logs every dispatched sample".to_string(),
            },
        }
    }

    /// Line logged for `sample`
    pub fn format(sample: &Sample) -> Result<String> {
        Ok(format!("{}: {}", WRITE_INFO_NAME, serde_json::to_string(sample)?))
    }
}

impl Default for WriteInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl WritePlugin for WriteInfo {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn write(&self, sample: &Sample) -> Result<()> {
        info!("{}", Self::format(sample)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvsmi_core::MetricType;

    #[test]
    fn test_format_includes_all_fields() {
        let mut sample = Sample::new("nvsmi", "1", MetricType::Percent, "utilization.gpu", "45");
        sample.host = "gpu-node-3".to_string();

        let line = WriteInfo::format(&sample).unwrap();
        assert!(line.starts_with("write_info: {"));
        for part in [
            "\"host\":\"gpu-node-3\"",
            "\"plugin\":\"nvsmi\"",
            "\"plugin_instance\":\"1\"",
            "\"type\":\"percent\"",
            "\"type_instance\":\"utilization.gpu\"",
            "\"values\":[\"45\"]",
        ] {
            assert!(line.contains(part), "{line} is missing {part}");
        }
    }

    #[test]
    fn test_write_never_fails_for_valid_samples() {
        let writer = WriteInfo::new();
        let sample = Sample::new("nvsmi", "0", MetricType::Gauge, "pstate", "8");
        assert!(writer.write(&sample).is_ok());
    }
}
